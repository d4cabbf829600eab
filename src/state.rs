use std::sync::Arc;

use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};

use crate::config::Config;
use crate::consts::order_const::{DB_DATABASE, DB_NAMESPACE};
use crate::errors::Result;
use crate::payments::{PaymentGateway, StripeGateway};
use crate::utils::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub sdb: Surreal<Any>,
    pub config: Config,
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Mailer,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self> {
        let sdb = any::connect(&config.database_url).await?;
        if let (Some(username), Some(password)) = (&config.db_username, &config.db_password) {
            sdb.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }
        sdb.use_ns(DB_NAMESPACE).use_db(DB_DATABASE).await?;

        let payments: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config)?);
        let mailer = Mailer::new(&config)?;

        Ok(Self {
            sdb,
            config,
            payments,
            mailer,
        })
    }
}
