#![deny(warnings)]
#![deny(rust_2018_idioms)]

use config::{Config, File};
use engine::settings::Settings;

pub mod anchorages;

#[test]
fn test_local_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/local.yml").required(true))
        .set_override("environment", "Local")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    settings.pipeline.validate().unwrap();
}

#[test]
fn test_production_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/production.yml").required(true))
        .set_override("environment", "Production")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    settings.pipeline.validate().unwrap();
}
