use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use taixiu_db::db::ArchivedRound;
use taixiu_db::models::Outcome;

pub fn display_rounds(rounds: &[ArchivedRound]) {
    if rounds.is_empty() {
        println!("Aucun tour à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tour", "Dés", "Somme", "Résultat", "Reçu le"]);

    for archived in rounds {
        let round = &archived.round;
        let dice_str = round
            .dice
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" - ");
        let color = match round.outcome {
            Outcome::Over => Color::Red,
            Outcome::Under => Color::Blue,
        };

        table.add_row(vec![
            Cell::new(round.sequence_id),
            Cell::new(dice_str),
            Cell::new(round.sum),
            Cell::new(round.outcome.label()).fg(color),
            Cell::new(&archived.fetched_at),
        ]);
    }

    println!("{table}");
}

pub fn display_pattern(rounds: &[ArchivedRound]) {
    // fetch_last_rounds renvoie du plus récent au plus ancien
    let pattern: String = rounds.iter().rev().map(|a| a.round.outcome.symbol()).collect();
    println!("\nMotif : {}", pattern);
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}
