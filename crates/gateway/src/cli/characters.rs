use pc_domain::config::Config;

use crate::bootstrap::load_catalog;

/// Print one line per catalog entry: id, name, category and rating.
pub fn list(config: &Config) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    for c in catalog.iter() {
        let premium = if c.is_premium { " [premium]" } else { "" };
        println!("{:<6} {:<24} {:<12} {:.1}{premium}", c.id, c.name, c.category, c.rating);
    }
    Ok(())
}
