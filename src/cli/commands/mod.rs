use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

use crate::marketplace::session::validate_cookie_path;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_OTLP_ENDPOINT: &str = "otlp-endpoint";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn validator_cookie_path() -> ValueParser {
    ValueParser::from(move |path: &str| -> std::result::Result<String, String> {
        validate_cookie_path(path).map_err(|err| err.to_string())?;
        Ok(path.to_string())
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("marketplace")
        .about("Session-guarded wiki and people API")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("MARKETPLACE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Password accepted by the login form")
                .env("MARKETPLACE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("pages-dir")
                .long("pages-dir")
                .help("Directory holding wiki pages")
                .default_value(".")
                .env("MARKETPLACE_PAGES_DIR"),
        )
        .arg(
            Arg::new("templates-dir")
                .long("templates-dir")
                .help("Directory with index, login, failed-login, view and edit .html templates (default: built-in)")
                .env("MARKETPLACE_TEMPLATES_DIR"),
        )
        .arg(
            Arg::new("login-title")
                .long("login-title")
                .help("Title of the login page")
                .default_value("Login to Marketplace")
                .env("MARKETPLACE_LOGIN_TITLE"),
        )
        .arg(
            Arg::new("cookie-path")
                .long("cookie-path")
                .help("Path attribute of the session cookie (default: none)")
                .env("MARKETPLACE_COOKIE_PATH")
                .value_parser(validator_cookie_path()),
        )
        .arg(
            Arg::new("cookie-secure")
                .long("cookie-secure")
                .help("Mark the session cookie Secure")
                .env("MARKETPLACE_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cookie-http-only")
                .long("cookie-http-only")
                .help("Mark the session cookie HttpOnly")
                .env("MARKETPLACE_COOKIE_HTTP_ONLY")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_OTLP_ENDPOINT)
                .long("otlp-endpoint")
                .help("OTLP gRPC endpoint for trace export, example: http://localhost:4317")
                .env("MARKETPLACE_OTLP_ENDPOINT"),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("MARKETPLACE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
