/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ConfigError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub building: BuildingConfig,
    pub timing: TimingConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct BuildingConfig {
    pub floor_count: u8,
    pub car_count: usize,
    pub max_cars: usize,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub unit_travel_ms: u64,
    pub door_ms: u64,
    pub dispatch_latency_ms: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    pub idle_poll_ms: u64,
    pub requeue_abandoned: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            idle_poll_ms: 250,
            requeue_abandoned: true,
        }
    }
}

impl TimingConfig {
    pub fn unit_travel(&self) -> Duration {
        Duration::from_millis(self.unit_travel_ms)
    }

    pub fn door(&self) -> Duration {
        Duration::from_millis(self.door_ms)
    }

    pub fn dispatch_latency(&self) -> Duration {
        Duration::from_millis(self.dispatch_latency_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            unit_travel_ms: 2500,
            door_ms: 2500,
            dispatch_latency_ms: 2500,
        }
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.building.max_cars == 0 {
            return Err(ConfigError::Invalid(
                "building.max_cars must be at least 1".to_string(),
            ));
        }
        if self.controller.idle_poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "controller.idle_poll_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [building]
        floor_count = 5
        car_count = 2
        max_cars = 6

        [timing]
        unit_travel_ms = 2500
        door_ms = 2500
        dispatch_latency_ms = 2500
    "#;

    #[test]
    fn test_parse_config_defaults_controller_section() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.building.floor_count, 5);
        assert_eq!(config.building.car_count, 2);
        assert_eq!(config.timing.unit_travel(), Duration::from_millis(2500));
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn test_parse_config_rejects_zero_max_cars() {
        let broken = SAMPLE.replace("max_cars = 6", "max_cars = 0");

        match parse_config(&broken) {
            Err(ConfigError::Invalid(_)) => {}
            other => panic!("Expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_reports_toml_errors() {
        assert!(matches!(
            parse_config("[building]\nfloor_count = \"five\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
