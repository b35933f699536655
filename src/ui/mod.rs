pub mod components;
pub mod pages;
pub mod theme;

use ratatui::Frame;

use crate::app::App;

/// Top-level draw function, dispatches to the active page
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    pages::render(f, app, area);
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc;

    use super::*;
    use crate::app::{Mode, Page};
    use crate::backend::gateway::fallback_interfaces;
    use crate::backend::simulator::{Simulator, SimulatorSettings};
    use crate::backend::types::CommandResponse;
    use crate::backend::Outcome;
    use crate::config::Config;
    use crate::event::Event;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn populated_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(tx, &Config::default());
        app.handle_event(Event::Interfaces(Outcome::Simulated {
            value: fallback_interfaces(),
            reason: "connection refused".into(),
        }));
        app.handle_event(key(KeyCode::Char('s')));
        app.handle_event(Event::ScanStarted {
            interface: "mon0".into(),
            outcome: Outcome::Live(CommandResponse::ok("Scan started")),
        });
        let batch = Simulator::new(SimulatorSettings {
            seed: Some(3),
            ..Default::default()
        })
        .step();
        app.handle_event(Event::ScanBatch(batch));
        app
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_every_page_renders() {
        let mut app = populated_app();
        for page in Page::ALL {
            app.active_page = page;
            let text = screen(&app);
            assert!(text.contains("SIMULATED DATA"), "{page:?} lacks the simulated badge");
        }
        app.active_page = Page::Networks;
        assert!(screen(&app).contains("HomeWiFi"));
        app.active_page = Page::Clients;
        assert!(screen(&app).contains("3C:22:FB:10:20:30"));
        app.active_page = Page::Dashboard;
        assert!(screen(&app).contains("New network discovered"));
    }

    #[test]
    fn test_attack_modal_renders_over_page() {
        let mut app = populated_app();
        app.active_page = Page::Networks;
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Attack);
        let text = screen(&app);
        assert!(text.contains("Deauthentication"));
        assert!(text.contains("00:11:22:33:44:55"));
        assert!(text.contains("2 associated clients"));

        app.handle_event(key(KeyCode::Enter));
        assert!(screen(&app).contains("authorized to test"));
    }

    #[test]
    fn test_empty_state_renders() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(tx, &Config::default());
        app.active_page = Page::Topology;
        assert!(screen(&app).contains("Nothing to draw yet"));
    }
}
