use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kbqa_core::config::{resolve_with_base, Config, Settings};
use kbqa_core::records::{HealthItem, Violation};
use kbqa_core::Record;
use kbqa_hybrid::{
    load_health, load_legal_library, load_traffic, Domain, FeedbackLog, KnowledgeEngine, Response, SearchOutcome,
};

#[derive(Parser)]
#[command(name = "kbqa", about = "Vietnamese traffic-law and health question answering", version)]
struct Cli {
    /// Knowledge domain to query
    #[arg(short, long, default_value = "traffic", global = true)]
    domain: Domain,

    /// Directory that relative data paths are resolved against (defaults to the current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question
    Query { text: String },
    /// Show the entities extracted from a question
    Entities { text: String },
    /// List indexed records
    List,
    /// Record counts and index size
    Stats,
    /// List traffic legal documents, or search them when a query is given
    Documents { query: Option<String> },
    /// Record whether an answer was helpful
    Feedback {
        query: String,
        #[arg(long)]
        unhelpful: bool,
    },
}

/// Human-readable rendering of a record.
trait Describe {
    fn headline(&self) -> String;
    fn details(&self) -> Vec<(&'static str, String)>;
}

impl Describe for Violation {
    fn headline(&self) -> String { self.description.clone() }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("Loại vi phạm", self.violation_type.clone()),
            ("Phương tiện", self.vehicle_type.clone()),
            ("Mức phạt", self.fine_amount.clone()),
        ];
        if let Some(p) = &self.additional_penalty {
            out.push(("Hình phạt bổ sung", p.clone()));
        }
        if let Some(r) = &self.legal_reference {
            out.push(("Căn cứ", r.clone()));
        }
        out
    }
}

impl Describe for HealthItem {
    fn headline(&self) -> String {
        match self {
            HealthItem::HealthAdvice(a) => a.condition_name.clone(),
            HealthItem::Nutrition(n) => format!("{} (dinh dưỡng)", n.food_name),
            HealthItem::Exercise(e) => format!("{} (thể chất)", e.exercise_name),
        }
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let opt = |label: &'static str, v: &Option<String>| v.as_ref().map(|v| (label, v.clone()));
        match self {
            HealthItem::HealthAdvice(a) => {
                let mut out: Vec<_> = opt("Triệu chứng", &a.symptoms).into_iter().collect();
                out.push(("Lời khuyên", a.advice.clone()));
                match a.warning_level.as_str() {
                    "caution" => out.push(("Lưu ý", "Cần theo dõi và có thể cần tư vấn bác sĩ".into())),
                    "emergency" => out.push(("Cảnh báo", "Cần đến cơ sở y tế ngay lập tức".into())),
                    _ => {}
                }
                out
            }
            HealthItem::Nutrition(n) => [
                opt("Lợi ích", &n.benefits),
                opt("Giá trị dinh dưỡng", &n.nutritional_value),
                opt("Phù hợp cho", &n.recommended_for),
                opt("Lưu ý", &n.cautions),
            ]
            .into_iter()
            .flatten()
            .collect(),
            HealthItem::Exercise(e) => {
                let mut out: Vec<_> = [opt("Mô tả", &e.description), opt("Lợi ích", &e.benefits)].into_iter().flatten().collect();
                if let Some(m) = e.duration_minutes {
                    out.push(("Thời gian", format!("{m} phút")));
                }
                out.extend([opt("Cường độ", &e.intensity_level), opt("Phù hợp cho", &e.suitable_for)].into_iter().flatten());
                out
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn with_spinner<T>(message: String, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    pb.finish_and_clear();
    out
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome<R: Describe>(query: &str, outcome: &SearchOutcome<R>) {
    match outcome {
        SearchOutcome::EmptyQuery => println!("Vui lòng nhập câu hỏi."),
        SearchOutcome::Emergency { condition, .. } => {
            println!("🚨 CẢNH BÁO KHẨN CẤP - {}", condition.condition_name.to_uppercase());
            println!("Triệu chứng: {}", condition.symptoms);
            println!("HÀNH ĐỘNG NGAY LẬP TỨC: {}", condition.immediate_action);
        }
        SearchOutcome::Ranked { results, .. } if results.is_empty() => {
            println!("Xin lỗi, không tìm thấy thông tin phù hợp với câu hỏi \"{query}\".");
        }
        SearchOutcome::Ranked { results, entities } => {
            if let Some(category) = &entities.category {
                println!("Phân loại: {category}");
            }
            for (i, r) in results.iter().enumerate() {
                println!("\n{}. {}  (confidence={:.3} similarity={:.3})", i + 1, r.record.headline(), r.confidence, r.similarity);
                for (label, value) in r.record.details() {
                    println!("   {label}: {value}");
                }
            }
        }
    }
}

fn run<R>(engine: &KnowledgeEngine<R>, cli: &Cli, settings: &Settings, base: &Path) -> Result<ExitCode>
where
    R: Record + Serialize + Describe,
{
    let json = cli.json;
    match &cli.command {
        Commands::Query { text } => {
            let response = engine.respond(text);
            if json {
                print_json(&response)?;
            }
            match response {
                Response::Answer { outcome } => {
                    if !json {
                        print_outcome(text, &outcome);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Response::Failure { code } => {
                    if !json {
                        eprintln!("❌ Đã có lỗi xảy ra khi xử lý câu hỏi ({code})");
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Entities { text } => {
            let entities = engine.extract_entities(text);
            if json {
                print_json(&entities)?;
            } else {
                println!("category: {}", entities.category.as_deref().unwrap_or("-"));
                println!("tags:     {}", entities.tags.join(", "));
                println!("topics:   {}", entities.topics.join(", "));
                println!("number:   {}", entities.number.map_or("-".to_string(), |n| n.to_string()));
                println!("urgency:  {}", entities.urgency.as_str());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => {
            let records = engine.store().list();
            if json {
                print_json(&records)?;
            } else {
                for r in &records {
                    println!("{}#{}  {}", r.source(), r.id(), r.headline());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats => {
            let stats = engine.stats();
            if json {
                print_json(&stats)?;
            } else {
                println!("domain:     {}", stats.domain);
                println!("generation: {}", stats.generation);
                for (source, count) in &stats.records_by_source {
                    println!("{source}: {count}");
                }
                println!("vocabulary: {}", stats.vocabulary_size);
                println!("emergency conditions: {}", stats.emergency_conditions);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Feedback { query, unhelpful } => record_feedback(settings, base, query, !unhelpful, json),
        Commands::Documents { query } => list_documents(settings, base, query.as_deref(), json),
    }
}

fn list_documents(settings: &Settings, base: &Path, query: Option<&str>, json: bool) -> Result<ExitCode> {
    let library = with_spinner("Loading legal documents".to_string(), || load_legal_library(settings, base))?;
    let documents = match query {
        Some(q) => library.search(q),
        None => library.list().into_iter().map(|d| (d, 1.0)).collect(),
    };
    if json {
        let docs: Vec<_> = documents.iter().map(|(d, _)| d).collect();
        return print_json(&docs).map(|_| ExitCode::SUCCESS);
    }
    for (doc, score) in &documents {
        let date = doc.effective_date.as_deref().unwrap_or("-");
        if query.is_some() {
            println!("#{}  {} ({})  hiệu lực {date}  similarity={score:.3}", doc.id, doc.title, doc.code);
        } else {
            println!("#{}  {} ({})  hiệu lực {date}  [{}]", doc.id, doc.title, doc.code, doc.status);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn record_feedback(settings: &Settings, base: &Path, query: &str, helpful: bool, json: bool) -> Result<ExitCode> {
    let log = FeedbackLog::new(resolve_with_base(base, &settings.data.feedback_log));
    let entry = log.record(query, helpful)?;
    if json {
        print_json(&entry)?;
    } else {
        println!("✅ Đã ghi nhận phản hồi vào {}", log.path().display());
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Config::load()?.settings()?;
    let base = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    debug!(domain = %cli.domain, base = %base.display(), ?settings, "settings loaded");
    let message = format!("Loading {} knowledge base", cli.domain);
    match cli.domain {
        Domain::Traffic => {
            let engine = with_spinner(message, || load_traffic(&settings, &base))?;
            run(&engine, &cli, &settings, &base)
        }
        Domain::Health => {
            let engine = with_spinner(message, || load_health(&settings, &base))?;
            run(&engine, &cli, &settings, &base)
        }
    }
}
