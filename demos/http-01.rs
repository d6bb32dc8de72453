use std::time::Duration;

use acme::{AcmeClient, AcmeKey, AuthorizationStatus, DirectoryUrl, Identifier};
use actix_files::Files;
use actix_web::{App, HttpServer};
use eyre::eyre;
use time::OffsetDateTime;
use tokio::fs;

const CHALLENGE_DIR: &str = "./acme-challenge";
const CERTIFICATE_DIR: &str = "./acme-certificates";

const PRIMARY_NAME: &str = "example.org";

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    fs::create_dir_all(CHALLENGE_DIR).await?;
    fs::create_dir_all(CERTIFICATE_DIR).await?;

    // Create temporary Actix Web server for ACME challenge.
    let srv = HttpServer::new(|| {
        App::new().service(Files::new("/.well-known/acme-challenge", CHALLENGE_DIR))
    })
    .bind(("0.0.0.0", 80))?
    .shutdown_timeout(0)
    .run();

    let srv_handle = srv.handle();
    let srv_task = actix_web::rt::spawn(srv);

    // Use `DirectoryUrl::LetsEncrypt` for production uses.
    //
    // You should write the account key to disk and load it with `AcmeKey::from_pem` afterwards.
    let client = AcmeClient::new(DirectoryUrl::LetsEncryptStaging, AcmeKey::generate_default()?)?;

    // Your contact addresses, note the `mailto:`.
    let contact = vec!["mailto:foo@bar.com".to_owned()];
    client.register(Some(contact)).await?;
    client.agree_to_terms().await?;

    let authz = client.authorize(&Identifier::dns(PRIMARY_NAME)).await?;

    // If ownership of the domain has been proven recently, the provider might consider the
    // authorization valid right away.
    if authz.need_challenge() {
        let account = client.account().await?;

        // For HTTP, the challenge is a text file that needs to be placed in your web server's
        // root:
        //
        // http://example.org/.well-known/acme-challenge/<token>
        let challenge = authz
            .http_challenge()
            .ok_or_else(|| eyre!("provider offered no http-01 challenge"))?;

        // The token is the filename, the key authorization is the content.
        let token = challenge
            .token()
            .ok_or_else(|| eyre!("http-01 challenge has no token"))?;
        let proof = challenge.key_authorization(&account)?;

        log::info!("serving proof for {PRIMARY_NAME} at {:?}", challenge.http_path());
        fs::write(format!("{CHALLENGE_DIR}/{token}"), proof).await?;

        // Once the file is accessible from the web, ask the provider to check it and poll the
        // authorization until it is decided.
        client.accept_challenge(challenge).await?;

        let authz = client
            .poll_authorization(authz.url(), Duration::from_millis(5000))
            .await?;

        if authz.status() != AuthorizationStatus::Valid {
            return Err(eyre!("authorization ended up {:?}", authz.status()));
        }
    }

    // Ownership is proven. Create a private key and CSR for the certificate.
    let key_pair = rcgen::KeyPair::generate()?;
    let csr = rcgen::CertificateParams::new(vec![PRIMARY_NAME.to_owned()])?
        .serialize_request(&key_pair)?;

    let not_before = OffsetDateTime::now_utc();
    let not_after = not_before + time::Duration::days(90);

    let cert = client
        .issue_certificate(csr.der(), not_before, not_after)
        .await?;

    log::info!("certificate issued at {}", cert.url());

    fs::write(format!("{CERTIFICATE_DIR}/{PRIMARY_NAME}.key"), key_pair.serialize_pem()).await?;
    fs::write(
        format!("{CERTIFICATE_DIR}/{PRIMARY_NAME}.der"),
        cert.certificate_chain()?.concat(),
    )
    .await?;

    // Stop temporary server for ACME challenge.
    srv_handle.stop(true).await;
    srv_task.await??;

    fs::remove_dir_all(CHALLENGE_DIR).await?;

    Ok(())
}
