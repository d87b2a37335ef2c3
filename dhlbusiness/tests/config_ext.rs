use dhlbusiness::{
    ApiVersion, BusinessShipment, BusinessShipmentBuilder, BusinessShipmentConfigExt, Credentials,
    DHL_PRODUCTION_URL, LabelResponseType, Mode, TestMode,
};
use dhlconfig::Config;
use std::fs;

fn load(yaml: Option<&str>) -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    if let Some(yaml) = yaml {
        fs::write(dir.path().join("config.yaml"), yaml).unwrap();
    }
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    (dir, config)
}

#[test]
fn test_defaults() {
    let (_dir, config) = load(None);

    assert_eq!(config.get_dhl_mode().unwrap(), Mode::Sandbox(TestMode::Normal));
    assert_eq!(config.get_dhl_version().unwrap(), ApiVersion::newest());
    assert_eq!(config.get_dhl_label_response_type().unwrap(), None);
    assert_eq!(config.get_dhl_custom_api_url().unwrap(), None);
    assert_eq!(config.get_dhl_timeout_secs().unwrap(), 30);
    assert_eq!(config.get_dhl_credentials().unwrap(), Credentials::default());
}

#[test]
fn test_live_configuration() {
    let (_dir, config) = load(Some(
        r#"
dhl:
  mode: live
  version: "3.1"
  label_response_type: b64
  timeout_secs: 10
  credentials:
    api_user: developer
    api_password: secret
    user: my_user
    signature: my_signature
    ekp: 6299999999
"#,
    ));

    let credentials = config.get_dhl_credentials().unwrap();
    assert_eq!(credentials.api_user(), "developer");
    assert_eq!(credentials.user(), "my_user");
    // Unquoted numbers are read as strings
    assert_eq!(credentials.ekp(10), "6299999999");
    assert_eq!(
        config.get_dhl_label_response_type().unwrap(),
        Some(LabelResponseType::Base64)
    );

    let dhl = BusinessShipment::from_config(&config).unwrap();
    assert_eq!(dhl.mode(), Mode::Live);
    assert_eq!(dhl.api_url(), DHL_PRODUCTION_URL);
    assert_eq!(dhl.version().to_string(), "3.1");
    assert_eq!(dhl.credentials().signature(), "my_signature");
}

#[test]
fn test_invalid_mode_is_an_error() {
    let (_dir, config) = load(Some("dhl:\n  mode: staging\n"));

    let err = config.get_dhl_mode().unwrap_err();
    assert!(err.to_string().contains("staging"));
    assert!(BusinessShipmentBuilder::from_config(&config).is_err());
}

#[test]
fn test_setters_are_persisted() {
    let (dir, config) = load(None);

    config.set_dhl_mode(Mode::Sandbox(TestMode::ThermoPrinter)).unwrap();
    config
        .set_dhl_credentials(&Credentials::new("developer", "secret").with_ekp("6299999999"))
        .unwrap();

    let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(
        reloaded.get_dhl_mode().unwrap(),
        Mode::Sandbox(TestMode::ThermoPrinter)
    );
    let credentials = reloaded.get_dhl_credentials().unwrap();
    assert_eq!(credentials.api_password(), "secret");
    assert_eq!(credentials.raw_ekp(), "6299999999");

    // Unset signature stays empty instead of being encrypted
    assert_eq!(
        reloaded.get_string(&["dhl", "credentials", "signature"]).unwrap(),
        None
    );

    // Sandbox mode swaps the customer account, not the developer account
    let dhl = BusinessShipment::from_config(&reloaded).unwrap();
    assert_eq!(dhl.credentials().api_user(), "developer");
    assert_eq!(dhl.credentials().user(), "3333333333_01");
}

#[test]
fn test_secrets_are_encrypted_on_disk() {
    let (dir, config) = load(None);

    config
        .set_dhl_credentials(
            &Credentials::new("developer", "topsecret")
                .with_user("my_user")
                .with_signature("my_signature"),
        )
        .unwrap();

    let on_disk = fs::read_to_string(dir.path().join("config.yaml")).unwrap();
    assert!(!on_disk.contains("topsecret"));
    assert!(!on_disk.contains("my_signature"));
    assert!(on_disk.contains("my_user"));

    let stored = config
        .get_string(&["dhl", "credentials", "api_password"])
        .unwrap()
        .unwrap();
    assert!(dhlconfig::encryption::is_encrypted(&stored));

    let credentials = Config::load_config(dir.path().to_str().unwrap())
        .unwrap()
        .get_dhl_credentials()
        .unwrap();
    assert_eq!(credentials.api_password(), "topsecret");
    assert_eq!(credentials.signature(), "my_signature");
}

#[test]
fn test_corrupted_secret_is_an_error() {
    let (_dir, config) = load(Some(
        "dhl:\n  credentials:\n    api_password: \"encrypted:AAAAAAAAAAAAAAAAAAAAAAAA\"\n",
    ));

    let err = config.get_dhl_credentials().unwrap_err();
    assert!(err.to_string().contains("api_password"));
}
