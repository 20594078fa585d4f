//! Opens the first page of the public artworks API and selects the first
//! 30 rows, spanning three pages.
//!
//! cargo run --example select_first_n

use artpager::viewer::{Options, Viewer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut viewer = Viewer::new(Options {
        rate: Some(2),
        prefetch: 2,
        ..Options::default()
    })?;

    let rows = viewer.open().await?;
    println!(
        "page {} holds {rows} rows, {} artworks in total",
        viewer.state().page(),
        viewer.state().total()
    );

    let run = viewer.select_first_n(30).await?;
    println!(
        "selected {} rows, fetched pages {:?}, failed pages {:?}",
        run.len(),
        run.pages_fetched,
        run.failed_pages
    );
    for record in viewer.state().selection().records() {
        println!("{:>8}  {}", record.id, record.title);
    }
    Ok(())
}
