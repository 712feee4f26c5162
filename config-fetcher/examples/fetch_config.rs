//! Loads a YAML config from a file and from Secret Manager
//!
//! Usage:
//!   cargo run -p config-fetcher --example fetch_config -- path/to/data.yaml
//!
//! The Secret Manager half reads `PROJECT_ID`, `SECRET_NAME` and
//! `SECRET_VERSION` from the environment or a `.env` file.

use config_fetcher::{ConfigLoader, ConfigValue, FormatTag, ProcessEnv, SourceSelector};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize)]
struct Conf {
    data: Data,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    nest_one_one: String,
    nest_one_two: String,
    #[serde(default)]
    nest_two: NestTwo,
}

#[derive(Debug, Default, Deserialize)]
struct NestTwo {
    nest_two_one: String,
    nest_two_list: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let env = ProcessEnv::with_dotenv();
    let loader = ConfigLoader::from_env(&env);

    // From a file, straight into a typed struct
    let path = std::env::args().nth(1).unwrap_or_else(|| "data.yaml".to_string());
    let mut conf = Conf::default();
    match loader.load_struct(&SourceSelector::file(&path), FormatTag::Yaml, &mut conf) {
        Ok(()) => println!("{:#?}", conf),
        Err(e) => eprintln!("Failed to load {}: {}", path, e),
    }

    // From Secret Manager, through an untyped value first
    let result = loader
        .read_secret_from_env(&env)
        .and_then(|raw| raw.decode::<ConfigValue>(FormatTag::Yaml))
        .and_then(|value| value.try_into_typed::<Conf>());
    match result {
        Ok(conf) => println!("{:#?}", conf),
        Err(e) => eprintln!("Failed to load secret: {}", e),
    }
}
