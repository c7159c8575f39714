//! Signs in to a site and prints the session cookie metadata.
//!
//! Run with:
//!   FEDSESSION_USERNAME=user@tenant.example \
//!   FEDSESSION_PASSWORD=... \
//!   FEDSESSION_SITE_URL=https://tenant.example/sites/team/ \
//!   cargo run --example fetch_cookies

use fedsession::{Credentials, SessionManager};

#[tokio::main]
async fn main() -> fedsession::Result<()> {
    let username = std::env::var("FEDSESSION_USERNAME").expect("FEDSESSION_USERNAME not set");
    let password = std::env::var("FEDSESSION_PASSWORD").expect("FEDSESSION_PASSWORD not set");
    let site_url = std::env::var("FEDSESSION_SITE_URL").expect("FEDSESSION_SITE_URL not set");

    let credentials = Credentials::new(username, password, site_url)?;
    let manager = SessionManager::new(credentials)?;

    let cookies = manager.cookies().await?;
    println!("session valid until {}", cookies.expires_at());
    for cookie in cookies.cookies() {
        println!(
            "  {} (domain={}, path={}, secure={}, http_only={})",
            cookie.name, cookie.domain, cookie.path, cookie.secure, cookie.http_only
        );
    }

    // A second call inside the validity window is served from the cache.
    let again = manager.cookies().await?;
    assert_eq!(cookies, again);

    Ok(())
}
