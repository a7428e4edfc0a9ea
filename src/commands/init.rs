//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: en

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public

# Date format (Moment.js style)
date_format: DD MMM YYYY

# Headless CMS
## PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override the values below
cms:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  document_type: post
  page_size: 20
  prerender_count: 3
  timeout_secs: 10
"#;

const ENV_EXAMPLE: &str = "PRISMIC_API_ENDPOINT=\nPRISMIC_ACCESS_TOKEN=\n";

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;
    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join(".env.example"), ENV_EXAMPLE)?;

    Ok(())
}
