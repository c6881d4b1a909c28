use subweaver::domain::Timestamp;

#[test]
fn given_srt_timestamp_when_parsing_then_millis_are_summed() {
    let ts: Timestamp = "01:02:03,456".parse().unwrap();
    assert_eq!(ts.as_millis(), 3_723_456);
}

#[test]
fn given_timestamp_when_displayed_then_uses_fixed_width_format() {
    assert_eq!(Timestamp::from_millis(61_005).to_string(), "00:01:01,005");
}

#[test]
fn given_dot_separated_millis_when_parsing_then_returns_error() {
    assert!("00:00:01.000".parse::<Timestamp>().is_err());
}

#[test]
fn given_out_of_range_minutes_when_parsing_then_returns_error() {
    assert!("00:61:00,000".parse::<Timestamp>().is_err());
}

#[test]
fn given_two_digit_millis_when_parsing_then_returns_error() {
    assert!("00:00:01,00".parse::<Timestamp>().is_err());
}
