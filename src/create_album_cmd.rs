use crate::auth;
use crate::config::Config;
use anyhow::{Result, bail};

pub(crate) fn main(cfg: &Config, title: &str) -> Result<()> {
    println!("Creating new album: '{title}'");
    let client = auth::acquire_client(cfg)?;
    let album = client.create_album(title)?;
    if album.id.is_empty() {
        bail!("Error creating album '{title}'");
    }
    println!("Created album '{}': {}", album.title, album.product_url);
    Ok(())
}
