use anyhow::Result;
use clap::{Parser, Subcommand};
use pokedash::dataset::Dataset;
use pokedash::engine::{Subset, count_by_type, filter_by_types, mean_by_type, top_n_by_total};
use pokedash::utils::fmt_number;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pokedash", about = "Interactive Pokémon statistics dashboard")]
pub struct Cli {
    /// CSV file to load. Overrides the configured path.
    #[arg(short, long, env = "POKEDASH_DATA", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every type with its creature count
    Types,
    /// Print the mean of a statistic for each type
    Mean {
        /// Statistic column, e.g. HP or Attack
        #[arg(short, long)]
        stat: String,

        /// Restrict to these types (repeatable). Defaults to all types.
        #[arg(short, long)]
        types: Vec<String>,
    },
    /// Rank creatures by their base stat total
    Top {
        #[arg(short, default_value_t = 10)]
        n: usize,

        /// Lowest totals first
        #[arg(long)]
        ascending: bool,

        /// Restrict to these types (repeatable). Defaults to all types.
        #[arg(short, long)]
        types: Vec<String>,
    },
}

pub fn run_command(dataset: &Dataset, command: Commands) -> Result<()> {
    match command {
        Commands::Types => print_types(dataset),
        Commands::Mean { stat, types } => print_means(dataset, &stat, &types),
        Commands::Top {
            n,
            ascending,
            types,
        } => {
            print_top(dataset, n, ascending, &types);
            Ok(())
        }
    }
}

fn subset<'a>(dataset: &'a Dataset, types: &[String]) -> Subset<'a> {
    if types.is_empty() {
        Subset::all(dataset)
    } else {
        filter_by_types(dataset, types)
    }
}

fn print_types(dataset: &Dataset) -> Result<()> {
    let counts = count_by_type(&Subset::all(dataset))?;
    for (type_name, count) in counts {
        println!("{type_name:<12} {count:>5}");
    }
    Ok(())
}

fn print_means(dataset: &Dataset, stat: &str, types: &[String]) -> Result<()> {
    let means = mean_by_type(&subset(dataset, types), stat)?;
    if means.is_empty() {
        println!("No creatures match the selected types.");
    }
    for (type_name, mean) in means {
        println!("{type_name:<12} {:>8}", fmt_number(mean));
    }
    Ok(())
}

fn print_top(dataset: &Dataset, n: usize, ascending: bool, types: &[String]) {
    let subset = subset(dataset, types);
    for (rank, creature) in top_n_by_total(&subset, n, ascending).iter().enumerate() {
        println!(
            "{:>3}. {:<16} {:<10} {:>6}",
            rank + 1,
            creature.name,
            creature.type_name,
            fmt_number(creature.bst)
        );
    }
}
