use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::detector::DetectorConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub kafka_bootstrap_servers: String,
    pub kafka_topic: String,
    pub kafka_group_id: String,
    pub kafka_auto_offset_reset: String,
    pub kafka_sasl_mechanism: String,
    pub kafka_username: String,
    pub kafka_password: String,
    pub kafka_security_protocol: String,
    pub kafka_max_retries: u32,
    pub kafka_circuit_breaker_cooldown: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: String,
    pub stop_window_minutes: i64,
    pub stop_min_samples: usize,
    pub stop_radius_km: f64,
    pub stop_min_duration_minutes: f64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let kafka_bootstrap_servers =
            env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let kafka_topic = env::var("KAFKA_TOPIC").unwrap_or_else(|_| "gps-fixes".to_string());
        let kafka_group_id =
            env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "fleet-stops-consumer".to_string());
        let kafka_auto_offset_reset =
            env::var("KAFKA_AUTO_OFFSET_RESET").unwrap_or_else(|_| "latest".to_string());
        let kafka_sasl_mechanism =
            env::var("KAFKA_SASL_MECHANISM").unwrap_or_else(|_| "SCRAM-SHA-256".to_string());
        let kafka_username = env::var("KAFKA_USERNAME").unwrap_or_default();
        let kafka_password = env::var("KAFKA_PASSWORD").unwrap_or_default();
        let kafka_security_protocol =
            env::var("KAFKA_SECURITY_PROTOCOL").unwrap_or_else(|_| "SASL_PLAINTEXT".to_string());
        let kafka_max_retries = env::var("KAFKA_MAX_RETRIES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let kafka_circuit_breaker_cooldown = env::var("KAFKA_CIRCUIT_BREAKER_COOLDOWN")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "fleet_stops".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "fleet".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "fleet".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        // Detection tuning. Defaults encode the nominal stop rule; override
        // per deployment when fleets report at unusual rates.
        let defaults = DetectorConfig::default();
        let stop_window_minutes = env::var("STOP_WINDOW_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.window_minutes);
        let stop_min_samples = env::var("STOP_MIN_SAMPLES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_samples);
        let stop_radius_km = env::var("STOP_RADIUS_KM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_drift_km);
        let stop_min_duration_minutes = env::var("STOP_MIN_DURATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_dwell_minutes);

        Ok(Self {
            kafka_bootstrap_servers,
            kafka_topic,
            kafka_group_id,
            kafka_auto_offset_reset,
            kafka_sasl_mechanism,
            kafka_username,
            kafka_password,
            kafka_security_protocol,
            kafka_max_retries,
            kafka_circuit_breaker_cooldown,
            database_url,
            db_max_connections,
            log_level,
            stop_window_minutes,
            stop_min_samples,
            stop_radius_km,
            stop_min_duration_minutes,
        })
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            window_minutes: self.stop_window_minutes,
            min_samples: self.stop_min_samples,
            max_drift_km: self.stop_radius_km,
            min_dwell_minutes: self.stop_min_duration_minutes,
        }
    }
}
