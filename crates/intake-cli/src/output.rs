//! Terminal output helpers.

use colored::Colorize;
use intake_core::EquipmentRecord;

pub fn print_records_table(records: &[EquipmentRecord]) {
    println!(
        "{:<6} {:<20} {:<24} {:<16} {:<16} {:>6}",
        "ID".bold(),
        "CREATED".bold(),
        "CLIENT".bold(),
        "VCI".bold(),
        "PHONE".bold(),
        "PHOTOS".bold()
    );
    println!("{}", "-".repeat(93));

    for record in records {
        println!(
            "{:<6} {:<20} {:<24} {:<16} {:<16} {:>6}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            truncate(&record.client_name, 24),
            or_dash(&truncate(&record.vci_serial, 16)),
            or_dash(&truncate(&record.phone, 16)),
            record.photos.len()
        );
    }

    println!();
    println!("{} record(s)", records.len());
}

pub fn print_record_detail(record: &EquipmentRecord) {
    println!("{} #{}", "Record".bold(), record.id);
    println!("{}", "-".repeat(40));
    println!("  {:<14} {}", "Client:".cyan(), record.client_name);
    println!("  {:<14} {}", "Email:".cyan(), or_dash(&record.email));
    println!("  {:<14} {}", "Phone:".cyan(), or_dash(&record.phone));
    println!("  {:<14} {}", "VCI serial:".cyan(), or_dash(&record.vci_serial));
    println!("  {:<14} {}", "Tablet serial:".cyan(), or_dash(&record.tablet_serial));
    println!("  {:<14} {}", "Prog serial:".cyan(), or_dash(&record.prog_serial));
    println!(
        "  {:<14} {}",
        "Created:".cyan(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !record.request_text.is_empty() {
        println!();
        println!("{}", "Request:".bold());
        for line in record.request_text.lines() {
            println!("  {}", line);
        }
    }

    println!();
    if record.photos.is_empty() {
        println!("{}", "No photos.".dimmed());
    } else {
        println!("{} ({})", "Photos".bold(), record.photos.len());
        for photo in &record.photos {
            println!(
                "  {} {}",
                photo.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                photo.image
            );
        }
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
