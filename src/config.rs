//! Configuration module
//!
//! All configuration comes from environment variables and is materialized
//! once at startup into an [`AppConfig`] that is passed into each component.
//! Optional subsystems (email, calendar) simply stay disabled when their
//! variables are absent.

use std::collections::HashMap;
use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {detail}")]
    InvalidVar { var: &'static str, detail: String },
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn var_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// External reservation store (PostgREST dialect)
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store, without the `/rest/v1` suffix
    pub url: String,
    /// Service credential attached to every call
    pub service_key: String,
}

/// Payment provider (hosted checkout + payment lookup)
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub access_token: String,
    pub base_url: String,
    /// Public base URL of this deployment, used for back URLs and the
    /// webhook notification URL
    pub app_base_url: String,
    pub back_url_success: Option<String>,
    pub back_url_failure: Option<String>,
    pub back_url_pending: Option<String>,
    pub currency: String,
}

impl PaymentConfig {
    pub fn success_url(&self) -> String {
        self.back_url_success
            .clone()
            .unwrap_or_else(|| format!("{}/pages/sucesso.html", self.app_base_url))
    }

    pub fn failure_url(&self) -> String {
        self.back_url_failure
            .clone()
            .unwrap_or_else(|| format!("{}/pages/erro.html", self.app_base_url))
    }

    pub fn pending_url(&self) -> String {
        self.back_url_pending
            .clone()
            .unwrap_or_else(|| format!("{}/pages/pendente.html", self.app_base_url))
    }

    pub fn notification_url(&self) -> String {
        format!("{}/api/v1/payments/webhook", self.app_base_url)
    }
}

/// Calendar provider (service-account credentials + per-flat calendar ids)
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub service_account_email: String,
    /// PEM private key; `\n` escapes are unfolded at load time
    pub service_account_key: String,
    /// Flat slug → calendar id
    pub calendar_ids: HashMap<String, String>,
    /// IANA zone name sent to the provider for event times
    pub timezone: String,
}

/// Email delivery: HTTP API provider first, SMTP as fallback
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: Option<String>,
}

/// Booking policy knobs
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Validity window of a pending hold, in minutes
    pub hold_minutes: i64,
    /// Fixed check-in hour (local time)
    pub checkin_hour: u32,
    /// Fixed check-out hour (local time)
    pub checkout_hour: u32,
    /// Fixed UTC offset of the property's local time, in hours
    pub utc_offset_hours: i32,
}

impl BookingConfig {
    /// The property's fixed local offset.
    pub fn offset(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| chrono::FixedOffset::east_opt(0).expect("zero offset"))
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            hold_minutes: 30,
            checkin_hour: 14,
            checkout_hour: 12,
            utc_offset_hours: -3,
        }
    }
}

/// Brand identity used in guest-facing email and calendar content
#[derive(Debug, Clone)]
pub struct BrandConfig {
    pub name: String,
    pub site: String,
    pub logo_url: String,
    pub support_email: String,
    pub whatsapp: String,
    pub address: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Sucesso Flat's".to_string(),
            site: "https://sucessoflats.vercel.app".to_string(),
            logo_url: "https://sucessoflats.vercel.app/public/logo-sucesso.png".to_string(),
            support_email: "sucessoflats@gmail.com".to_string(),
            whatsapp: "+55 86 9 8175-0070".to_string(),
            address: "Teresina/PI".to_string(),
        }
    }
}

/// Application configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub payment: PaymentConfig,
    pub calendar: Option<CalendarConfig>,
    pub email: EmailConfig,
    pub booking: BookingConfig,
    pub brand: BrandConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig {
            host: var_opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match var_opt("PORT") {
                Some(p) => p.parse().map_err(|e| ConfigError::InvalidVar {
                    var: "PORT",
                    detail: format!("{}", e),
                })?,
                None => 8080,
            },
        };

        let store = StoreConfig {
            url: var("SUPABASE_URL")?,
            service_key: var("SUPABASE_SERVICE_KEY")?,
        };

        let payment = PaymentConfig {
            access_token: var("MP_ACCESS_TOKEN")?,
            base_url: var_opt("MP_BASE_URL")
                .unwrap_or_else(|| "https://api.mercadopago.com".to_string()),
            app_base_url: var("APP_BASE_URL")?,
            back_url_success: var_opt("MP_BACK_URL_SUCCESS"),
            back_url_failure: var_opt("MP_BACK_URL_FAILURE"),
            back_url_pending: var_opt("MP_BACK_URL_PENDING"),
            currency: var_opt("PAYMENT_CURRENCY").unwrap_or_else(|| "BRL".to_string()),
        };

        let calendar = match (var_opt("GOOGLE_SA_EMAIL"), var_opt("GOOGLE_SA_PRIVATE_KEY")) {
            (Some(email), Some(key)) => Some(CalendarConfig {
                service_account_email: email,
                service_account_key: key.replace("\\n", "\n"),
                calendar_ids: parse_calendar_ids(&var_opt("CALENDAR_IDS").unwrap_or_default()),
                timezone: var_opt("CALENDAR_TIMEZONE")
                    .unwrap_or_else(|| "America/Fortaleza".to_string()),
            }),
            _ => None,
        };

        let email = EmailConfig {
            api_key: var_opt("RESEND_API_KEY"),
            api_url: var_opt("EMAIL_API_URL").unwrap_or_else(|| "https://api.resend.com".to_string()),
            from: var_opt("EMAIL_FROM"),
            smtp_host: var_opt("SMTP_HOST"),
            smtp_port: var_opt("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_user: var_opt("SMTP_USER"),
            smtp_pass: var_opt("SMTP_PASS"),
            smtp_from: var_opt("SMTP_FROM"),
        };

        let booking = BookingConfig {
            hold_minutes: var_opt("HOLD_MINUTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            ..BookingConfig::default()
        };

        let brand = BrandConfig {
            name: var_opt("BRAND_NAME").unwrap_or_else(|| BrandConfig::default().name),
            site: var_opt("BRAND_SITE").unwrap_or_else(|| BrandConfig::default().site),
            logo_url: var_opt("BRAND_LOGO_URL").unwrap_or_else(|| BrandConfig::default().logo_url),
            support_email: var_opt("BRAND_SUPPORT_EMAIL")
                .unwrap_or_else(|| BrandConfig::default().support_email),
            whatsapp: var_opt("BRAND_WHATSAPP").unwrap_or_else(|| BrandConfig::default().whatsapp),
            address: var_opt("BRAND_ADDRESS").unwrap_or_else(|| BrandConfig::default().address),
        };

        Ok(Self {
            server,
            store,
            payment,
            calendar,
            email,
            booking,
            brand,
        })
    }
}

/// Parse the `CALENDAR_IDS` mapping: `flat-1=cal_abc,flat-2=cal_def`.
fn parse_calendar_ids(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (slug, id) = pair.split_once('=')?;
            let slug = slug.trim();
            let id = id.trim();
            if slug.is_empty() || id.is_empty() {
                None
            } else {
                Some((slug.to_string(), id.to_string()))
            }
        })
        .collect()
}
