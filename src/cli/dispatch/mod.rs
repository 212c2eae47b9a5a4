use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let password = matches
        .get_one::<String>("password")
        .cloned()
        .context("missing required argument: --password")?;

    Ok(Action::Server(Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        password: SecretString::from(password),
        pages_dir: matches
            .get_one::<String>("pages-dir")
            .map_or_else(|| PathBuf::from("."), PathBuf::from),
        templates_dir: matches.get_one::<String>("templates-dir").map(PathBuf::from),
        login_title: matches
            .get_one::<String>("login-title")
            .cloned()
            .context("missing argument: --login-title")?,
        cookie_path: matches.get_one::<String>("cookie-path").cloned(),
        cookie_secure: matches.get_flag("cookie-secure"),
        cookie_http_only: matches.get_flag("cookie-http-only"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_args() {
        temp_env::with_vars(
            [
                ("MARKETPLACE_PORT", None::<&str>),
                ("MARKETPLACE_TEMPLATES_DIR", None),
                ("MARKETPLACE_COOKIE_SECURE", None),
                ("MARKETPLACE_COOKIE_HTTP_ONLY", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "marketplace",
                    "--password",
                    "secret",
                    "--pages-dir",
                    "/srv/wiki",
                    "--cookie-path",
                    "/",
                    "--cookie-http-only",
                ]);

                let action = handler(&matches);
                assert!(action.is_ok());
                let Ok(Action::Server(args)) = action else {
                    return;
                };
                assert_eq!(args.port, 8080);
                assert_eq!(args.password.expose_secret(), "secret");
                assert_eq!(args.pages_dir, PathBuf::from("/srv/wiki"));
                assert_eq!(args.templates_dir, None);
                assert_eq!(args.login_title, "Login to Marketplace");
                assert_eq!(args.cookie_path.as_deref(), Some("/"));
                assert!(!args.cookie_secure);
                assert!(args.cookie_http_only);
            },
        );
    }

    #[test]
    fn args_debug_hides_password() {
        let matches =
            commands::new().get_matches_from(vec!["marketplace", "--password", "hunter2"]);
        let action = handler(&matches).map(|action| format!("{action:?}"));
        assert!(action.is_ok_and(|debug| !debug.contains("hunter2")));
    }
}
