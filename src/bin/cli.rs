//! flatbook CLI
//!
//! Command-line interface for a flatbook store.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use flatbook::{Book, BookId, Store, StoreConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// flatbook CLI
#[derive(Parser, Debug)]
#[command(name = "flatbook")]
#[command(about = "Fixed-record flat-file book store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./flatbook_data")]
    data_dir: PathBuf,

    /// Active file stem
    #[arg(short, long, default_value = "Books")]
    base_name: String,

    /// Maximum number of records
    #[arg(short, long, default_value = "1000")]
    max_records: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a book
    Add {
        id: BookId,
        title: String,
        year: i32,
        price: f64,
    },

    /// Print every book in storage order
    List,

    /// Print the first book with the given id
    Get { id: BookId },

    /// Change fields of an existing book
    Update {
        id: BookId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        price: Option<f64>,
    },

    /// Delete a book, keeping a timestamped backup of the store
    Delete { id: BookId },

    /// Seed five books, edit two, delete one
    Demo,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,flatbook=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> flatbook::Result<()> {
    let config = StoreConfig::builder()
        .data_dir(&args.data_dir)
        .base_name(&args.base_name)
        .max_records(args.max_records)
        .build()?;

    let mut store = Store::open(config)?;

    match args.command {
        Commands::Add {
            id,
            title,
            year,
            price,
        } => {
            store.add(&Book::new(id, title, year, price))?;
            println!("Added #{} ({} records)", id, store.len());
        }
        Commands::List => print_all(&mut store)?,
        Commands::Get { id } => match store.find(id)? {
            Some(book) => println!("{}", book),
            None => println!("No book #{}", id),
        },
        Commands::Update {
            id,
            title,
            year,
            price,
        } => {
            let Some(mut book) = store.find(id)? else {
                println!("No book #{}", id);
                return store.close();
            };
            if let Some(title) = title {
                book.title = title;
            }
            if let Some(year) = year {
                book.year = year;
            }
            if let Some(price) = price {
                book.price = price;
            }
            store.update(&book)?;
            println!("{}", book);
        }
        Commands::Delete { id } => match store.delete(id)? {
            Some(deleted) => println!(
                "Deleted #{}, backup at {}",
                deleted.record.id,
                deleted.backup_path.display()
            ),
            None => println!("No book #{}", id),
        },
        Commands::Demo => demo(&mut store)?,
    }

    store.close()
}

fn print_all(store: &mut Store) -> flatbook::Result<()> {
    for book in store.iter()? {
        println!("{}", book?);
    }
    Ok(())
}

fn demo(store: &mut Store) -> flatbook::Result<()> {
    let books = [
        Book::new(20, "Wild", 2012, 12.15),
        Book::new(1, "Wild and Free", 2016, 9.89),
        Book::new(3, "Into the Wild", 1997, 11.49),
        Book::new(44, "The Wild Truth", 2015, 11.68),
        Book::new(50, "The Sound of a Wild Snail Eating", 2016, 12.25),
    ];
    for book in &books {
        store.add(book)?;
    }
    println!("Database records after creating and adding 5 books:");
    print_all(store)?;

    if let Some(mut book) = store.find(3)? {
        book.title = "Not Into the Wild".to_string();
        store.update(&book)?;
    }
    if let Some(mut book) = store.find(50)? {
        book.price = 99.99;
        store.update(&book)?;
    }
    println!("Database records after modifying ISBN #3 title, and ISBN #50 price:");
    print_all(store)?;

    store.delete(44)?;
    println!("Database records after deleting ISBN #44:");
    print_all(store)
}
