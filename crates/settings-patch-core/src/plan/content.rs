//! Literal file contents written by the patch plans.
//!
//! Templates use `__SETTINGS_PACKAGE__` and `__APP_PACKAGE__` placeholders
//! rather than `format!` so the Python braces can stay unescaped.

const SETTINGS_PACKAGE: &str = "__SETTINGS_PACKAGE__";
const APP_PACKAGE: &str = "__APP_PACKAGE__";

/// Build script for the hosting platform: install, collect static, migrate.
pub const BUILD_SCRIPT: &str = "\
#!/usr/bin/env bash
# exit on error
set -o errexit

pip install -r requirements.txt

python manage.py collectstatic --no-input
python manage.py migrate
";

/// Dependency manifest for local development.
pub const LOCAL_REQUIREMENTS: &str = "\
Django
Pillow
";

/// First line of the media section appended in cloud mode.
pub const MANAGED_MEDIA_BEGIN: &str = "\n# >>> settings-patch: cloud media >>>\n";
/// Last line of the media section appended in cloud mode.
pub const MANAGED_MEDIA_END: &str = "# <<< settings-patch: cloud media <<<\n";

const MANAGED_MEDIA_BODY: &str = "\
import os

if 'RENDER' in os.environ:
    print(\"--- SETTINGS: CONFIGURING CLOUDINARY ---\")

    CLOUDINARY_STORAGE = {
        'CLOUD_NAME': os.environ.get('CLOUDINARY_CLOUD_NAME'),
        'API_KEY': os.environ.get('CLOUDINARY_API_KEY'),
        'API_SECRET': os.environ.get('CLOUDINARY_API_SECRET'),
    }

    DEFAULT_FILE_STORAGE = 'cloudinary_storage.storage.MediaCloudinaryStorage'

    MEDIA_URL = 'https://res.cloudinary.com/' + os.environ.get('CLOUDINARY_CLOUD_NAME', '') + '/'
else:
    print(\"--- SETTINGS: CONFIGURING LOCAL STORAGE ---\")
    MEDIA_URL = '/images/'
    MEDIA_ROOT = os.path.join(BASE_DIR, 'static/images')
";

/// The complete media section appended to the settings file in cloud mode,
/// bracketed by [`MANAGED_MEDIA_BEGIN`] and [`MANAGED_MEDIA_END`].
pub fn managed_media_section() -> String {
    [MANAGED_MEDIA_BEGIN, MANAGED_MEDIA_BODY, MANAGED_MEDIA_END].concat()
}

/// First line of the static-files section appended in cloud mode.
pub const MANAGED_STATIC_BEGIN: &str = "\n# >>> settings-patch: static files >>>\n";
/// Last line of the static-files section appended in cloud mode.
pub const MANAGED_STATIC_END: &str = "# <<< settings-patch: static files <<<\n";

// Relies on the `import os` at the top of the media section.
const MANAGED_STATIC_BODY: &str = "\
if 'RENDER' in os.environ:
    STATIC_ROOT = os.path.join(BASE_DIR, 'staticfiles')
    STATICFILES_STORAGE = 'whitenoise.storage.CompressedManifestStaticFilesStorage'
else:
    STATIC_ROOT = os.path.join(BASE_DIR, 'staticfiles_local')
";

/// The static-files section appended after the media section in cloud mode,
/// bracketed by [`MANAGED_STATIC_BEGIN`] and [`MANAGED_STATIC_END`].
pub fn managed_static_section() -> String {
    [MANAGED_STATIC_BEGIN, MANAGED_STATIC_BODY, MANAGED_STATIC_END].concat()
}

/// Entry point into `MIDDLEWARE`; WhiteNoise must come right after it.
pub const SECURITY_MIDDLEWARE_ANCHOR: &str = "'django.middleware.security.SecurityMiddleware',";

/// Opening marker of the injected debug `home` view.
pub const DEBUG_VIEW_BEGIN: &str = "\n# >>> settings-patch: debug home view >>>\n";
/// Closing marker of the injected debug `home` view.
pub const DEBUG_VIEW_END: &str = "# <<< settings-patch: debug home view <<<\n";

/// Import line after which the debug view is inserted.
pub const VIEWS_IMPORT_ANCHOR: &str = "from django.contrib import messages\n";

/// First line of the stock `home` view.
pub const HOME_VIEW_START: &str = "def home(request):";

/// Last line of the stock `home` view for `app_package`.
pub fn home_view_end(app_package: &str) -> String {
    format!(
        "return render(request, '{app_package}/home.html', \
         {{'categories': categories, 'cartItems': data['cartItems']}})"
    )
}

const DEBUG_VIEW_BODY: &str = "\
def home(request):
    data = get_cart_data(request)
    categories = Category.objects.all()

    products = Product.objects.all()[:3]
    for p in products:
        print(f\"[DEBUG] Product: {p.name} | Image URL: {p.imageURL}\")

    return render(request, '__APP_PACKAGE__/home.html', {'categories': categories, 'cartItems': data['cartItems']})
";

/// The replacement `home` view that prints product image URLs.
pub fn debug_home_view(app_package: &str) -> String {
    [
        DEBUG_VIEW_BEGIN,
        &DEBUG_VIEW_BODY.replace(APP_PACKAGE, app_package),
        DEBUG_VIEW_END,
    ]
    .concat()
}

const LOCAL_SETTINGS: &str = "\
from pathlib import Path
import os

BASE_DIR = Path(__file__).resolve().parent.parent

SECRET_KEY = 'django-insecure-local-development-key'
DEBUG = True
ALLOWED_HOSTS = ['*']

INSTALLED_APPS = [
    'django.contrib.admin',
    'django.contrib.auth',
    'django.contrib.contenttypes',
    'django.contrib.sessions',
    'django.contrib.messages',
    'django.contrib.staticfiles',
    '__APP_PACKAGE__',
]

MIDDLEWARE = [
    'django.middleware.security.SecurityMiddleware',
    'django.contrib.sessions.middleware.SessionMiddleware',
    'django.middleware.common.CommonMiddleware',
    'django.middleware.csrf.CsrfViewMiddleware',
    'django.contrib.auth.middleware.AuthenticationMiddleware',
    'django.contrib.messages.middleware.MessageMiddleware',
    'django.middleware.clickjacking.XFrameOptionsMiddleware',
]

ROOT_URLCONF = '__SETTINGS_PACKAGE__.urls'

TEMPLATES = [
    {
        'BACKEND': 'django.template.backends.django.DjangoTemplates',
        'DIRS': [],
        'APP_DIRS': True,
        'OPTIONS': {
            'context_processors': [
                'django.template.context_processors.debug',
                'django.template.context_processors.request',
                'django.contrib.auth.context_processors.auth',
                'django.contrib.messages.context_processors.messages',
            ],
        },
    },
]

WSGI_APPLICATION = '__SETTINGS_PACKAGE__.wsgi.application'

DATABASES = {
    'default': {
        'ENGINE': 'django.db.backends.sqlite3',
        'NAME': BASE_DIR / 'db.sqlite3',
    }
}

AUTH_USER_MODEL = '__APP_PACKAGE__.User'

AUTH_PASSWORD_VALIDATORS = []

LANGUAGE_CODE = 'en-us'
TIME_ZONE = 'UTC'
USE_I18N = True
USE_TZ = True

STATIC_URL = '/static/'
STATICFILES_DIRS = [os.path.join(BASE_DIR, 'static')]

MEDIA_URL = '/images/'
MEDIA_ROOT = os.path.join(BASE_DIR, 'static/images')

EMAIL_BACKEND = 'django.core.mail.backends.console.EmailBackend'
EMAIL_HOST_USER = 'webmaster@localhost'

DEFAULT_AUTO_FIELD = 'django.db.models.BigAutoField'
";

/// Known-good settings file for local development.
pub fn local_settings(settings_package: &str, app_package: &str) -> String {
    LOCAL_SETTINGS
        .replace(SETTINGS_PACKAGE, settings_package)
        .replace(APP_PACKAGE, app_package)
}
