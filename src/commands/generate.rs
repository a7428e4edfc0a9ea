//! Generate static files

use anyhow::Result;

use crate::cms::SharedClient;
use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static site from the configured CMS
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let client = blog.client()?;
    run_with_client(blog, client).await
}

/// Generate the static site from the given client
pub async fn run_with_client(blog: &Blog, client: SharedClient) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, client)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated listing with {} posts and {} post pages in {:.2}s",
        report.listed,
        report.posts.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}
