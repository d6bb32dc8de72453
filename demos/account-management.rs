use std::io;

use acme::{AcmeClient, AcmeKey, DirectoryUrl, Registration};
use tokio::fs;

const ACCOUNTS_DIR: &str = "./acme-accounts";

const CONTACT_EMAIL: Option<&str> = None;

#[actix_web::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("ensuring accounts dir exists");
    fs::create_dir_all(ACCOUNTS_DIR).await?;

    let key_path = format!("{ACCOUNTS_DIR}/account.pem");

    log::info!("loading account key from disk");
    let acme_key = match fs::read_to_string(&key_path).await {
        Ok(pem) => AcmeKey::from_pem(&pem)?,

        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("generating account key");
            let acme_key = AcmeKey::generate_default()?;

            log::info!("persisting account key to {key_path}");
            fs::write(&key_path, acme_key.to_pem()?.as_bytes()).await?;

            acme_key
        }

        Err(err) => return Err(err.into()),
    };

    let client = AcmeClient::new(DirectoryUrl::LetsEncryptStaging, acme_key)?;

    let contact = CONTACT_EMAIL.map(|email| vec![format!("mailto:{email}")]);

    log::info!("registering with ACME provider");
    match client.register(contact).await? {
        Registration::Created(acc) => log::info!("registered new account at {}", acc.url()),
        Registration::Existing(url) => log::info!("account key already registered at {url}"),
    }

    let acc = client.account().await?;

    if !acc.has_agreed_to_terms() {
        log::info!("agreeing to terms of service");
        client.agree_to_terms().await?;
    }

    dbg!(client.account().await?);

    Ok(())
}
