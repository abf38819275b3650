//! The `tutorforge init` command: scaffolds a `tutorforge.toml`, a `data/`
//! directory, and starter knowledge/problem files.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tutorforge.toml").exists() {
        println!("tutorforge.toml already exists, skipping.");
    } else {
        std::fs::write("tutorforge.toml", SAMPLE_CONFIG)?;
        println!("Created tutorforge.toml");
    }

    std::fs::create_dir_all("data")?;

    write_if_absent("data/problems.json", STARTER_PROBLEMS)?;
    write_if_absent("data/error_dictionary.json", STARTER_ERROR_DICTIONARY)?;
    write_if_absent("data/lab_manual_index.json", STARTER_LAB_MANUAL_INDEX)?;

    println!("\nNext steps:");
    println!("  1. Edit tutorforge.toml with your LLM API key");
    println!("  2. Run: tutorforge problems");
    println!("  3. Run: tutorforge submit --user alice --problem add-two --language python --file solution.py");

    Ok(())
}

fn write_if_absent(path: &str, contents: &str) -> Result<()> {
    if std::path::Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, contents)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tutorforge configuration

llm_api_key = "${LLM_API_KEY}"
oracle_base_url = "https://api.anthropic.com"
oracle_model = "claude-sonnet-4-20250514"
max_retries = 3
retry_delay_secs = 2
allow_runtime_override = false
sandbox_image = "tutorforge-sandbox:latest"
wall_clock_timeout_secs = 5
memory_limit_mb = 256
cpu_limit = 0.5
data_dir = "./data"
"#;

const STARTER_PROBLEMS: &str = r#"{
  "add-two": {
    "id": "add-two",
    "title": "Add Two Numbers",
    "description": "Read two integers from stdin and print their sum.",
    "sample_cases": [{"input": "1 2", "output": "3"}],
    "hidden_cases": [
      {"input": "4 5", "output": "9"},
      {"input": "-3 3", "output": "0"}
    ],
    "difficulty": "Easy"
  }
}
"#;

const STARTER_ERROR_DICTIONARY: &str = r#"{
  "priority_1": [
    {
      "type": "SYNTAX_ERROR",
      "priority": 1,
      "pattern": "SyntaxError|IndentationError",
      "concept": "Syntax",
      "hint_template": "Check your syntax against the language grammar.",
      "citation": "Chapter 1: Syntax"
    }
  ]
}
"#;

const STARTER_LAB_MANUAL_INDEX: &str = r#"{
  "LOGIC_ERROR": {"citation": "Chapter 3: Debugging Logic"}
}
"#;
