use simdeck::AppError;

#[test]
fn display_prefixes_identify_the_variant() {
    let cases = [
        (AppError::Config("bad".into()), "config: bad"),
        (AppError::EngineNotRunning, "engine not running"),
        (AppError::InvalidCommand("X".into()), "invalid command: X"),
        (AppError::Parse("eof".into()), "parse: eof"),
        (AppError::Spawn("not found".into()), "spawn: not found"),
        (AppError::FileRead("data.mc".into()), "file read: data.mc"),
        (AppError::Http("bind".into()), "http: bind"),
        (AppError::Io("broken pipe".into()), "io: broken pipe"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn messages_have_no_trailing_period() {
    let err = AppError::Spawn("no such file".into());
    let s = err.to_string();
    assert!(!s.ends_with('.'), "error message must not end with a period: {s}");
}

#[test]
fn io_error_converts_to_io_variant() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: AppError = io.into();
    assert!(matches!(err, AppError::Io(ref msg) if msg.contains("pipe closed")));
}

#[test]
fn toml_error_converts_to_config_variant() {
    let parse_err = toml::from_str::<toml::Value>("= nope").expect_err("invalid toml");
    let err: AppError = parse_err.into();
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn not_running_message_tells_user_to_submit() {
    assert_eq!(
        simdeck::errors::NOT_RUNNING_MESSAGE,
        "Simulator is not running. Submit code first."
    );
}
