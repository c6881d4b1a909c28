use subweaver::presentation::Environment;

#[test]
fn given_known_names_when_parsing_environment_then_aliases_are_accepted() {
    assert_eq!(
        Environment::try_from("local".to_string()),
        Ok(Environment::Local)
    );
    assert_eq!(
        Environment::try_from(" Development ".to_string()),
        Ok(Environment::Local)
    );
    assert_eq!(
        Environment::try_from("test".to_string()),
        Ok(Environment::Test)
    );
    assert_eq!(
        Environment::try_from("PRODUCTION".to_string()),
        Ok(Environment::Prod)
    );
}

#[test]
fn given_unknown_name_when_parsing_environment_then_returns_error() {
    let result = Environment::try_from("staging".to_string());

    assert!(result.unwrap_err().contains("staging"));
}

#[test]
fn given_environment_when_displayed_then_matches_settings_file_suffix() {
    assert_eq!(Environment::Prod.to_string(), "prod");
    assert_eq!(Environment::Test.as_str(), "test");
}
