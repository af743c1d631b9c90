use crate::dev::{DevConfig, DevError};
use anyhow::Result;
use log::debug;
use std::path::PathBuf;

pub fn resolve(config: &DevConfig, specifier: &str) -> Result<PathBuf, DevError> {
    config
        .aliases
        .resolve(specifier)
        .ok_or_else(|| DevError::UnknownAlias(specifier.to_string()))
}

pub fn run(config: &DevConfig, specifier: &str) -> Result<()> {
    let path = resolve(config, specifier)?;
    debug!("{} -> {:?}", specifier, path);
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn resolves_through_alias_table() {
        let config = DevConfig::new(Path::new("/srv/meowmail"), 3000).unwrap();
        assert_eq!(
            resolve(&config, "@/views/Login.vue").unwrap(),
            PathBuf::from("/srv/meowmail/src/views/Login.vue")
        );
    }

    #[test]
    fn unknown_specifier_is_an_error() {
        let config = DevConfig::new(Path::new("/srv/meowmail"), 3000).unwrap();
        assert!(matches!(
            resolve(&config, "axios"),
            Err(DevError::UnknownAlias(s)) if s == "axios"
        ));
    }
}
