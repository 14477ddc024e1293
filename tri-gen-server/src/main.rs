use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use tri_gen_core::io::{get_filename, list_files, normalize_folder, read_corpus};
use tri_gen_core::model::trigram_model::{TrainingSummary, TrigramModel, DEFAULT_MAX_LENGTH};

/// Upper bound on sentences per `/v1/generate` request.
const MAX_COUNT: usize = 100;

/// Upper bound on words per generated sentence.
const MAX_LENGTH: usize = 1000;

/// Command-line configuration of the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "tri-gen-server")]
#[command(about = "HTTP front end for a trigram text generator")]
#[command(version)]
struct Config {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(short, long, default_value_t = 5000)]
	port: u16,

	/// Directory holding `.txt` training corpora
	#[arg(long, default_value = "./data")]
	data_dir: String,

	/// Corpora (comma separated names) to train on at startup
	#[arg(long)]
	corpus: Option<String>,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_length: Option<usize>,
	count: Option<usize>,
}

#[derive(Deserialize)]
struct CorporaQuery {
	names: Option<String>,
}

/// Model summary as returned by `/v1/fit`, `/v1/load_corpora` and `/v1/summary`
#[derive(Serialize)]
struct SummaryResponse<'a> {
	trained: bool,
	corpora: &'a [String],
	#[serde(flatten)]
	summary: TrainingSummary,
}

/// The model is not meant for concurrent use: every handler goes through this lock.
struct SharedData {
	model: TrigramModel,
	corpora: Vec<String>,
	data_dir: PathBuf,
}

impl SharedData {
	fn new(data_dir: PathBuf) -> Self {
		Self { model: TrigramModel::new(), corpora: Vec::new(), data_dir }
	}

	fn summary(&self) -> SummaryResponse<'_> {
		SummaryResponse {
			trained: self.model.is_trained(),
			corpora: &self.corpora,
			summary: self.model.summary(),
		}
	}

	/// Reads `<data_dir>/<name>.txt` for every name and retrains on their concatenation.
	///
	/// # Errors
	/// `InvalidInput` if a name is not a plain file name, or any read error.
	/// The model is left untouched on error.
	fn load_corpora(&mut self, names: &[&str]) -> io::Result<()> {
		if let Some(name) = names.iter().find(|name| !is_corpus_name(name)) {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid corpus name {name:?}")));
		}

		let mut text = String::new();
		for name in names {
			text.push_str(&read_corpus(self.data_dir.join(format!("{name}.txt")))?);
			text.push('\n');
		}
		self.model.fit(&text);
		self.corpora = names.iter().map(|name| (*name).to_owned()).collect();
		info!("Trained on {:?}: {:?}", self.corpora, self.model.summary());
		Ok(())
	}
}

/// A corpus name must be a single path component: no separators, no `..`.
fn is_corpus_name(name: &str) -> bool {
	Path::new(name).file_name() == Some(OsStr::new(name))
}

/// Splits a comma separated list of names, dropping blanks.
fn parse_names(names: &str) -> Vec<&str> {
	names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect()
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` sentences of at most `max_length` words, one per line.
/// An untrained model answers with empty lines.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let max_length = query.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
	let count = query.count.unwrap_or(1);

	if count == 0 || count > MAX_COUNT {
		return HttpResponse::BadRequest().body(format!("Count must be between 1 and {MAX_COUNT}"));
	}
	if max_length > MAX_LENGTH {
		return HttpResponse::BadRequest().body(format!("Max length must be at most {MAX_LENGTH}"));
	}

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let lines: Vec<String> = (0..count).map(|_| shared_data.model.generate(max_length)).collect();
	HttpResponse::Ok().body(lines.join("\n"))
}

/// HTTP POST endpoint `/v1/fit`
///
/// Retrains the model on the raw request body, replacing everything learned before.
#[post("/v1/fit")]
async fn post_fit(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	shared_data.model.fit(&body);
	shared_data.corpora.clear();
	info!("Trained on request body: {:?}", shared_data.model.summary());

	HttpResponse::Ok().json(shared_data.summary())
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match list_files(&data_dir, "txt") {
		Ok(files) => {
			let names: Vec<String> = files.iter().filter_map(|file| get_filename(file).ok()).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(e) => {
			warn!("Failed to list {}: {e}", data_dir.display());
			HttpResponse::InternalServerError().body("Failed to list corpora")
		}
	}
}

#[get("/v1/summary")]
async fn get_summary(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.summary())
}

#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<CorporaQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let names = query.names.as_deref().map(parse_names).unwrap_or_default();
	if names.is_empty() {
		return HttpResponse::BadRequest().body("Missing or empty corpus name");
	}

	match shared_data.load_corpora(&names) {
		Ok(()) => HttpResponse::Ok().json(shared_data.summary()),
		Err(e) if e.kind() == io::ErrorKind::InvalidInput => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
	}
}

/// Main entry point for the server.
///
/// Optionally pre-trains on the corpora given on the command line, wraps the
/// model in a `Mutex` and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = Config::parse();
	let mut shared_data = SharedData::new(normalize_folder(&config.data_dir));

	if let Some(corpus) = &config.corpus {
		if let Err(e) = shared_data.load_corpora(&parse_names(corpus)) {
			error!("Failed to load startup corpora {corpus:?}: {e}");
			return Err(e);
		}
	}

	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Listening on {}:{}", config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(post_fit)
			.service(get_corpora)
			.service(put_corpora)
			.service(get_summary)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
