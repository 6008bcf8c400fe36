use std::sync::Arc;

use crate::auth::reset_token::ResetTokenGenerator;
use crate::config::Config;
use crate::db::Store;
use crate::email::Mailer;
use crate::rate_limit::AttemptLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub reset_tokens: ResetTokenGenerator,
    pub login_limiter: AttemptLimiter,
    pub reset_limiter: AttemptLimiter,
}
