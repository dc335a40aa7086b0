//! # Basic Usage Example
//!
//! This example walks through the core of TableHaus:
//! - Declaring tables at runtime with typed fields
//! - Creating, reading, updating and deleting records
//! - Searching, filtering, sorting and paging a listing
//! - Resolving relation fields
//!
//! It runs on the in-memory backend. Set `DATABASE_URL` to run the same
//! steps against PostgreSQL instead.

use std::sync::Arc;
use tablehaus::prelude::*;

fn values(value: Value) -> ValueMap {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 TableHaus Basic Usage Example");
    println!("=================================");

    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPool::connect(&url).await?;
            let haus =
                TableHaus::from_backend(Arc::new(PgStore::new(pool)), ContentConfig::default());
            haus.migrate().await?;
            haus.health_check().await?;
            println!("📊 Using PostgreSQL");
            run(&haus).await?;
            haus.close().await;
        }
        Err(_) => {
            println!("📊 Using the in-memory backend");
            run(&TableHaus::in_memory(ContentConfig::default())).await?;
        }
    }

    Ok(())
}

async fn run<B: Backend>(haus: &TableHaus<B>) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Declare tables
    println!("\n📋 Step 1: Declare tables");
    println!("--------------------------");

    let authors = haus
        .schemas()
        .create(NewSchema::new(
            "Authors",
            "demo-authors",
            vec![
                FieldDefinition::new("name", "Name", DataType::Text).required(),
                FieldDefinition::new("country", "Country", DataType::Text),
            ],
        ))
        .await?;
    println!("✅ Created table '{}' ({} fields)", authors.table_name, authors.fields.len());

    let books = haus
        .schemas()
        .create(NewSchema::new(
            "Books",
            "demo-books",
            vec![
                FieldDefinition::new("title", "Title", DataType::Text).required(),
                FieldDefinition::new("year", "Year", DataType::Number),
                FieldDefinition::new("genre", "Genre", DataType::Options)
                    .with_options(["fiction", "essay", "poetry"]),
                FieldDefinition::new("author", "Author", DataType::Relation).with_relation(
                    RelationConfig::new(RelationKind::ManyToOne, "demo-authors", "name")
                        .display_field("name"),
                ),
            ],
        ))
        .await?;
    println!("✅ Created table '{}' ({} fields)", books.table_name, books.fields.len());

    // 2. Create records
    println!("\n📝 Step 2: Create records");
    println!("--------------------------");

    for (name, country) in [("Ursula", "US"), ("Italo", "IT")] {
        haus.contents()
            .create("demo-authors", values(json!({ "name": name, "country": country })))
            .await?;
    }

    let mut first = None;
    for (title, year, genre, author) in [
        ("The Dispossessed", 1974, "fiction", "Ursula"),
        ("Invisible Cities", 1972, "fiction", "Italo"),
        ("Six Memos", 1988, "essay", "Italo"),
        ("Unattributed", 2001, "poetry", "Anonymous"),
    ] {
        let record = haus
            .contents()
            .create(
                "demo-books",
                values(json!({ "title": title, "year": year, "genre": genre, "author": author })),
            )
            .await?;
        println!("✅ {} -> {}", title, record.id);
        first.get_or_insert(record.id);
    }

    match haus
        .contents()
        .create("demo-books", values(json!({ "title": "Bad", "pages": 12 })))
        .await
    {
        Err(e) => println!("❌ Rejected as expected: {}", e),
        Ok(_) => println!("⚠️ Unknown field was accepted"),
    }

    // 3. List
    println!("\n🔎 Step 3: Search, filter, sort, page");
    println!("--------------------------------------");

    let params = QueryParams::new()
        .filter("genre", "fiction")
        .sort("title", SortOrder::Asc)
        .page(1, 10);
    let page = haus.contents().list("demo-books", &params).await?;
    println!("Fiction: {} record(s), {} page(s)", page.total, page.total_pages);
    for record in &page.contents {
        let author = record
            .values
            .get("_author_related")
            .and_then(|related| related.get("country"))
            .and_then(Value::as_str)
            .unwrap_or("?");
        println!(
            "  • {} (author from {})",
            record.text_value("title").unwrap_or_default(),
            author
        );
    }

    let page = haus
        .contents()
        .list("demo-books", &QueryParams::new().search("ITALO"))
        .await?;
    println!("Search 'ITALO': {} record(s)", page.total);

    let options = haus.contents().related_options("demo-books", "author").await?;
    println!("Author choices: {}", options.len());

    // 4. Update and delete
    println!("\n✏️ Step 4: Update and delete");
    println!("-----------------------------");

    if let Some(id) = first {
        let updated = haus
            .contents()
            .update(
                id,
                values(json!({
                    "title": "The Dispossessed",
                    "year": 1974,
                    "genre": "fiction",
                    "author": "Ursula",
                    "_note": "reserved keys pass validation"
                })),
            )
            .await?;
        println!("✅ Updated at {}", updated.updated_at);

        haus.contents().delete(id).await?;
        println!("✅ Deleted {}", id);
    }

    haus.schemas().delete("demo-books").await?;
    haus.schemas().delete("demo-authors").await?;
    println!("✅ Dropped both tables and their records");

    Ok(())
}
