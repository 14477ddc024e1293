use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use tri_gen_core::attention::{scaled_dot_product_attention, Mask, Matrix};
use tri_gen_core::io::{get_filename, read_corpus};
use tri_gen_core::model::trigram_model::{TrigramModel, DEFAULT_MAX_LENGTH};

const BUILTIN_CORPUS: &str = "I am a robot. I am a student. You are a robot too! \
    Are you a student? The robot reads a book. The student reads a book too. \
    A robot is not a student. I am not a book!";

#[derive(Parser, Debug)]
#[command(name = "tri-gen-exemple")]
#[command(about = "Trains a trigram model and prints generated sentences")]
struct Args {
    /// Text file to train on (built-in sample text if omitted)
    #[arg(long)]
    corpus: Option<String>,

    /// Number of sentences to generate
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Maximum number of words per sentence
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Do not run the attention demo
    #[arg(long)]
    skip_attention: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the training text
    let (name, text) = match &args.corpus {
        Some(path) => (get_filename(path)?, read_corpus(path)?),
        None => ("built-in".to_owned(), BUILTIN_CORPUS.to_owned()),
    };

    // Every call to 'fit' replaces what was learned before
    let mut model = TrigramModel::new();
    model.fit(&text);
    info!("Trained on '{}': {:?}", name, model.summary());

    // Empty or punctuation-only text leaves the model untrained:
    // generation then simply returns empty strings
    if !model.is_trained() {
        println!("Nothing to learn from '{}'", name);
    }

    // A fixed seed gives the same sentences on every run
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    for i in 0..args.count {
        println!("Generated sentence {}: {}", i + 1, model.generate_with_rng(args.max_length, &mut rng));
    }

    if !args.skip_attention {
        attention_demo()?;
    }

    Ok(())
}

/// Single sequence of length 3, with and without a causal mask.
fn attention_demo() -> Result<(), String> {
    let q = Matrix::from_rows(&[vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]])?;
    let k = Matrix::from_rows(&[vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0], vec![0.0, 1.0, 1.0]])?;
    let v = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]])?;

    let (output, weights) = scaled_dot_product_attention(&q, &k, &v, None)?;
    print_matrix("Attention weights", &weights);
    print_matrix("Attention output", &output);

    let (output, weights) = scaled_dot_product_attention(&q, &k, &v, Some(&Mask::causal(3)))?;
    print_matrix("Causal attention weights", &weights);
    print_matrix("Causal attention output", &output);

    // Q and K must share their last dimension
    match scaled_dot_product_attention(&q, &v, &v, None) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("\n{}", e),
    }

    Ok(())
}

fn print_matrix(title: &str, matrix: &Matrix) {
    println!("\n{} (shape ({}, {})):", title, matrix.rows(), matrix.cols());
    for i in 0..matrix.rows() {
        let row: Vec<String> = matrix.row(i).iter().map(|value| format!("{:.3}", value)).collect();
        println!("[{}]", row.join(" "));
    }
}
