// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::MeshStats;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report mesh statistics with colors
    pub fn report_stats(file: &str, stats: &MeshStats, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "File:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        if stats.is_valid {
            println!("{} {}", "✅".green(), "Mesh is valid".green().bold());
        } else {
            println!("{} {}", "❌".red(), "Mesh is invalid".red().bold());
        }

        println!("\n{}", "Counts:".bold());
        Self::print_count("Vertices", stats.vertex_count);
        Self::print_count("Topology vertices", stats.topology_vertex_count);
        Self::print_count("Faces", stats.face_count);
        Self::print_count("Triangles", stats.triangle_count);
        Self::print_count("Quads", stats.quad_count);
        Self::print_count("Hidden vertices", stats.hidden_vertex_count);
        Self::print_count("Disjoint pieces", stats.disjoint_pieces);

        println!("\n{}", "Shape:".bold());
        let [min_x, min_y, min_z, max_x, max_y, max_z] = stats.bbox;
        println!(
            "  {} [{:.4}, {:.4}, {:.4}] → [{:.4}, {:.4}, {:.4}]",
            "Bounds:".bright_black(),
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z
        );
        println!(
            "  {} {}",
            "Area:".bright_black(),
            format!("{:.4}", stats.surface_area).cyan()
        );
        if stats.is_closed {
            println!(
                "  {} {}",
                "Volume:".bright_black(),
                format!("{:.4}", stats.volume).cyan()
            );
        }

        println!("\n{}", "Topology:".bold());
        Self::print_flag("Closed", stats.is_closed);
        Self::print_flag("Manifold", stats.is_manifold);
        Self::print_flag("Oriented", stats.is_oriented);
        Self::print_problem("Naked edges", stats.naked_edge_count);
        Self::print_problem("Degenerate faces", stats.degenerate_face_count);

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a completed write
    pub fn report_written(file: &str, vertices: usize, faces: usize, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Wrote:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_count("Vertices", vertices);
        Self::print_count("Faces", faces);
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, value: usize) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.to_string().cyan()
        );
    }

    fn print_flag(name: &str, value: bool) {
        let formatted = if value { "yes".green() } else { "no".yellow() };
        println!("  {} {}", format!("{}:", name).bright_black(), formatted);
    }

    /// Zero is good news, anything else is highlighted
    fn print_problem(name: &str, value: usize) {
        let formatted = if value == 0 {
            value.to_string().green()
        } else {
            value.to_string().red()
        };
        println!("  {} {}", format!("{}:", name).bright_black(), formatted);
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_report_stats_does_not_panic() {
        Reporter::report_stats("empty.json", &MeshStats::empty(), Duration::from_micros(1));
    }
}
