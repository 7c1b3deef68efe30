//! Output formatting and terminal rendering
//!
//! Handles colored terminal output for frames, legends and traffic summaries.

use colored::Colorize;
use topoview::{ElementClass, FlowLegend, RenderFrame};

/// Join service names, eliding past `max`
fn format_services(services: &[String], max: usize) -> String {
    if services.len() <= max {
        return services.join(", ");
    }
    format!(
        "{} (+{} more)",
        services[..max].join(", "),
        services.len() - max
    )
}

/// Output handler for terminal display
pub struct OutputHandler {
    /// Print node positions with each frame
    pub show_positions: bool,
}

impl OutputHandler {
    pub fn new(show_positions: bool) -> Self {
        Self { show_positions }
    }

    /// Print a section header
    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", format!("▶ {}", text).bright_yellow().bold());
        println!("{}", "─".repeat(60).dimmed());
    }

    /// Print a success message
    pub fn print_success(&self, text: &str) {
        println!("{} {}", "✓".bright_green(), text.bright_white());
    }

    /// Print an error message
    pub fn print_error(&self, text: &str) {
        eprintln!("{} {}", "✗".bright_red(), text.bright_red());
    }

    /// Print a warning message
    pub fn print_warning(&self, text: &str) {
        println!("{} {}", "⚠".bright_yellow(), text.yellow());
    }

    /// Print an info message
    pub fn print_info(&self, text: &str) {
        println!("{} {}", "ℹ".bright_blue(), text);
    }

    /// Print one rendered topology revision
    pub fn print_frame(&self, frame: &RenderFrame) {
        let dev_nodes = frame.elements.dev_nodes().count();
        self.print_header(&format!(
            "Revision {} at {}",
            frame.revision,
            frame.published_at.format("%H:%M:%S")
        ));
        println!(
            "  {} {}   {} {}   {} {}",
            "Nodes:".dimmed(),
            frame.elements.nodes.len(),
            "Edges:".dimmed(),
            frame.elements.edges.len(),
            "Dev:".dimmed(),
            dev_nodes.to_string().bright_red()
        );
        println!();

        for node in &frame.elements.nodes {
            let label = match node.classes {
                ElementClass::Prod => node.data.label.normal(),
                _ => node.data.label.bright_red(),
            };
            let versions = node.data.versions.len();
            if self.show_positions {
                let pos = frame.layout.position(node.id()).unwrap_or_default();
                println!(
                    "  {:<32} {:>2} {}  {}",
                    label,
                    versions,
                    "versions".dimmed(),
                    format!("({:.0}, {:.0})", pos.x, pos.y).dimmed()
                );
            } else {
                println!("  {:<32} {:>2} {}", label, versions, "versions".dimmed());
            }
        }
        println!();
    }

    /// Print flows table
    pub fn print_legend(&self, legend: &FlowLegend) {
        if legend.is_empty() {
            self.print_info("No flows deployed.");
            return;
        }

        println!();
        println!(
            "{}",
            format!("{:<28} {:<10} {}", "Flow", "Kind", "Services")
                .bright_white()
                .bold()
        );
        println!("{}", "─".repeat(80).dimmed());

        for flow in &legend.flows {
            let kind = if flow.is_baseline {
                "baseline".bright_green()
            } else {
                "dev".bright_red()
            };
            println!(
                "{:<28} {:<10} {}",
                flow.flow_id.bright_white(),
                kind,
                format_services(&flow.services, 6).dimmed()
            );
        }
        println!();
    }

    /// Print a one-line traffic summary
    pub fn print_traffic(&self, live_tokens: usize, edges: usize) {
        println!(
            "{} {} of {} edges carrying traffic",
            "↝".bright_cyan(),
            live_tokens.to_string().bright_cyan(),
            edges
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("svc-{}", i)).collect()
    }

    #[test]
    fn test_format_services_short_list() {
        assert_eq!(format_services(&names(2), 6), "svc-0, svc-1");
        assert_eq!(format_services(&[], 6), "");
    }

    #[test]
    fn test_format_services_elides() {
        assert_eq!(format_services(&names(5), 2), "svc-0, svc-1 (+3 more)");
    }
}
