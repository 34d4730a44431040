use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use taixiu_db::models::{Outcome, Prediction};
use crate::backtest::BacktestReport;
use crate::engine::RuleEngine;

pub fn display_rules(engine: &RuleEngine) {
    println!("\n== Chaîne de règles (ordre d'évaluation) ==\n");
    println!("Historique minimum : {} tours (sinon tirage au hasard)\n", engine.min_history());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Règle", "Paramètres"]);

    for (i, rule) in engine.rules().iter().enumerate() {
        let mut params: Vec<(String, f64)> = rule.params().into_iter().collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        let params_str = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![(i + 1).to_string(), rule.name().to_string(), params_str]);
    }

    println!("{table}");
}

pub fn display_prediction(prediction: &Prediction) {
    let color = match prediction.outcome {
        Outcome::Over => Color::Red,
        Outcome::Under => Color::Blue,
    };
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Prochain tour", "Règle", "Confiance"]);
    table.add_row(vec![
        Cell::new(prediction.outcome.label()).fg(color),
        Cell::new(&prediction.rule_name),
        Cell::new(format!("{:.0}%", prediction.confidence * 100.0)),
    ]);
    println!("{table}");
}

pub fn display_backtest(report: &BacktestReport) {
    println!("\n== Backtest walk-forward (fenêtre {}) ==\n", report.window);

    if report.n_tests == 0 {
        println!("  (Pas assez de tours archivés)");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Règle", "Déclenchée", "Correctes", "Taux"]);

    for score in &report.rule_scores {
        let rate = if score.fired > 0 {
            let pct = score.hit_rate() * 100.0;
            let color = if pct >= 50.0 { Color::Green } else { Color::Red };
            Cell::new(format!("{:.1}%", pct)).fg(color)
        } else {
            Cell::new("—")
        };
        table.add_row(vec![
            Cell::new(&score.rule_name),
            Cell::new(score.fired),
            Cell::new(score.hits),
            rate,
        ]);
    }

    println!("{table}");
    println!(
        "\nTotal : {}/{} ({:.1}%)",
        report.correct,
        report.n_tests,
        report.accuracy() * 100.0
    );
}
