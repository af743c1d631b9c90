use crate::dev::DevConfig;
use anyhow::Result;

pub fn render(config: &DevConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn run(config: &DevConfig) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn renders_port_and_routes() {
        let config = DevConfig::new(Path::new("/srv/meowmail"), 4000).unwrap();
        let rendered = render(&config).unwrap();

        assert!(rendered.contains("\"port\": 4000"));
        assert!(rendered.contains("\"/socket.io\""));
        assert!(rendered.contains("http://localhost:5000/"));
    }
}
