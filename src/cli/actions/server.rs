use crate::marketplace::{
    self,
    pages::FilePageStore,
    people::People,
    session::{AuthConfig, AuthState, StaticPasswordVerifier},
    templates::Templates,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub password: SecretString,
    pub pages_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub login_title: String,
    pub cookie_path: Option<String>,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
}

/// Handle the server action
/// # Errors
/// Returns an error if the templates cannot be loaded or the server fails to start.
pub async fn handle(args: Args) -> Result<()> {
    let templates = match &args.templates_dir {
        Some(dir) => Templates::load(dir).await?,
        None => Templates::builtin(),
    };

    if !args.cookie_secure || !args.cookie_http_only {
        warn!(
            secure = args.cookie_secure,
            http_only = args.cookie_http_only,
            "Session cookie is not fully hardened"
        );
    }

    let auth_config = AuthConfig::new()
        .with_login_title(args.login_title)
        .with_cookie_path(args.cookie_path)?
        .with_cookie_secure(args.cookie_secure)
        .with_cookie_http_only(args.cookie_http_only);
    debug!("auth config: {:?}", auth_config);

    let verifier = StaticPasswordVerifier::new(&args.password);
    let auth_state = Arc::new(AuthState::new(auth_config, Arc::new(verifier)));

    marketplace::new(
        args.port,
        auth_state,
        Arc::new(templates),
        Arc::new(FilePageStore::new(args.pages_dir)),
        Arc::new(People::seeded()),
    )
    .await
}
