use super::theme::Theme;
use crate::domain::{ChartPeriod, WeightEntry, WeightStore};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, poll};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
};
use std::collections::HashMap;
use std::io::{self, Stdout, stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiTab {
    Calendar,
    Chart,
}

/// Read-only browser over the store: a five-week calendar with entry
/// markers and a trend chart. Mutations go through the CLI.
pub struct TrackerTui<'a> {
    store: &'a WeightStore,
    tab: TuiTab,
    period: ChartPeriod,
    /// Week shown in the middle calendar row
    current_week_start: NaiveDate,
    selected_date: NaiveDate,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_exit: bool,
    show_help: bool,
    theme: Theme,
}

impl<'a> TrackerTui<'a> {
    pub fn new(
        store: &'a WeightStore,
        theme_name: &str,
        tab: TuiTab,
        period: ChartPeriod,
    ) -> io::Result<Self> {
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }

        enable_raw_mode().map_err(|e| {
            io::Error::other(format!("Failed to enable raw mode: {e}"))
        })?;

        stdout().execute(EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode(); // Clean up on failure
            io::Error::other(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::other(format!("Failed to create terminal: {e}"))
        })?;

        let today = chrono::Local::now().date_naive();

        Ok(Self {
            store,
            tab,
            period,
            current_week_start: Self::week_start(today),
            selected_date: today,
            terminal,
            should_exit: false,
            show_help: false,
            theme: Theme::by_name(theme_name),
        })
    }

    /// Start of the week (Sunday) for a given date
    fn week_start(date: NaiveDate) -> NaiveDate {
        let days_since_sunday = date.weekday().num_days_from_sunday();
        date - Duration::days(i64::from(days_since_sunday))
    }

    fn week_dates(week_start: NaiveDate) -> Vec<NaiveDate> {
        (0..7).map(|i| week_start + Duration::days(i)).collect()
    }

    /// Which visible days have a recorded entry.
    fn recorded_days(&self, weeks: &[NaiveDate]) -> HashMap<NaiveDate, bool> {
        let mut recorded = HashMap::new();

        for &week_start in weeks {
            for date in Self::week_dates(week_start) {
                recorded.insert(date, self.store.existing_entry(date).is_some());
            }
        }

        recorded
    }

    fn calculate_centered_area(available: Rect, needed_width: u16, needed_height: u16) -> Rect {
        let width = std::cmp::min(available.width, needed_width);
        let height = std::cmp::min(available.height, needed_height);

        let left_margin = available.width.saturating_sub(width) / 2;
        let top_margin = available.height.saturating_sub(height) / 2;

        Rect {
            x: available.x + left_margin,
            y: available.y + top_margin,
            width,
            height,
        }
    }

    fn date_style(
        date: NaiveDate,
        is_focused_week: bool,
        selected_date: NaiveDate,
        theme: &Theme,
    ) -> Style {
        let is_selected = date == selected_date;
        let is_today = date == chrono::Local::now().date_naive();
        let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

        if is_selected {
            let bg = theme.colors.selected_bg;
            if is_weekend {
                Style::default().fg(theme.colors.weekend).bg(bg)
            } else if is_focused_week {
                Style::default().fg(theme.colors.focused).bg(bg)
            } else {
                Style::default().fg(theme.colors.dimmed).bg(bg)
            }
        } else if is_today {
            Style::default()
                .fg(theme.colors.today)
                .add_modifier(Modifier::BOLD)
        } else if is_weekend {
            Style::default().fg(theme.colors.weekend)
        } else if is_focused_week {
            Style::default().fg(theme.colors.focused)
        } else {
            Style::default().fg(theme.colors.dimmed)
        }
    }

    fn week_row(
        week_start: NaiveDate,
        is_focused: bool,
        selected_date: NaiveDate,
        theme: &Theme,
        recorded: &HashMap<NaiveDate, bool>,
    ) -> Row<'static> {
        let cells: Vec<Cell> = Self::week_dates(week_start)
            .iter()
            .map(|&date| {
                let day = date.day();
                let style = Self::date_style(date, is_focused, selected_date, theme);

                // Month indicator on the 1st
                let day_text = if day == 1 {
                    format!("{} {}", date.format("%b"), day)
                } else {
                    day.to_string()
                };

                // Dot marks a recorded day
                let content = if *recorded.get(&date).unwrap_or(&false) {
                    format!("{day_text}•")
                } else {
                    format!("{day_text} ")
                };

                Cell::from(content).style(style)
            })
            .collect();

        let mut row = Row::new(cells);
        if is_focused {
            row = row.style(Style::default().bg(theme.colors.focused_week_bg));
        }

        row
    }

    fn calendar_table(
        current_week_start: NaiveDate,
        selected_date: NaiveDate,
        theme: &Theme,
        recorded: &HashMap<NaiveDate, bool>,
    ) -> Table<'static> {
        // 5 weeks: 2 before, focused week, 2 after
        let weeks: Vec<NaiveDate> = (-2..=2)
            .map(|offset| current_week_start + Duration::weeks(offset))
            .collect();

        let header = Row::new(vec![
            Cell::from("Sun").style(Style::default().fg(theme.colors.weekend)),
            Cell::from("Mon").style(Style::default().fg(theme.colors.header)),
            Cell::from("Tue").style(Style::default().fg(theme.colors.header)),
            Cell::from("Wed").style(Style::default().fg(theme.colors.header)),
            Cell::from("Thu").style(Style::default().fg(theme.colors.header)),
            Cell::from("Fri").style(Style::default().fg(theme.colors.header)),
            Cell::from("Sat").style(Style::default().fg(theme.colors.weekend)),
        ])
        .height(1);

        let rows: Vec<Row> = weeks
            .iter()
            .enumerate()
            .map(|(i, &week_start)| {
                Self::week_row(week_start, i == 2, selected_date, theme, recorded)
            })
            .collect();

        Table::new(
            rows,
            [
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(15),
                Constraint::Percentage(15),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::NONE)
                .title(format!("{}", selected_date.format("%B %Y")))
                .title_style(Style::default().fg(theme.colors.header))
                .title_alignment(Alignment::Center),
        )
        .column_spacing(1)
    }

    fn entry_display(
        entry: Option<&WeightEntry>,
        previous: Option<&WeightEntry>,
        theme: &Theme,
    ) -> Paragraph<'static> {
        let Some(entry) = entry else {
            return Paragraph::new(vec![Line::from(vec![Span::styled(
                "No entry for this date".to_string(),
                Style::default().fg(theme.colors.dimmed),
            )])])
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Left);
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(
                entry.formatted_weight(),
                Style::default()
                    .fg(theme.colors.focused)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", entry.date.format("%A, %B %-d, %Y")),
                Style::default().fg(theme.colors.dimmed),
            ),
        ])];

        if let Some(previous) = previous {
            let delta = entry.weight - previous.weight;
            lines.push(Line::from(vec![Span::styled(
                format!("{delta:+.1} kg since {}", previous.short_date()),
                Style::default().fg(theme.colors.dimmed),
            )]));
        }

        if let Some(note) = &entry.note {
            lines.push(Line::from(vec![Span::styled(
                note.clone(),
                Style::default().fg(theme.colors.focused),
            )]));
        }

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Left)
    }

    fn chart_view<'p>(
        points: &'p [(f64, f64)],
        x_bounds: [f64; 2],
        x_labels: Vec<String>,
        period: ChartPeriod,
        theme: &Theme,
    ) -> Chart<'p> {
        let (min_w, max_w) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), &(_, w)| (min.min(w), max.max(w)),
        );
        // 10% headroom each side, widened when the span collapses
        let pad = ((max_w - min_w) * 0.1).max(0.5);
        let y_bounds = [min_w - pad, max_w + pad];

        let datasets = vec![
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.colors.chart_line))
                .data(points),
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme.colors.chart_line))
                .data(points),
        ];

        let y_labels: Vec<String> = [y_bounds[0], (y_bounds[0] + y_bounds[1]) / 2.0, y_bounds[1]]
            .iter()
            .map(|w| format!("{w:.1}"))
            .collect();

        Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::NONE)
                    .title(format!("Weight ({period})"))
                    .title_style(Style::default().fg(theme.colors.header))
                    .title_alignment(Alignment::Center),
            )
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(theme.colors.dimmed))
                    .bounds(x_bounds)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(theme.colors.dimmed))
                    .bounds(y_bounds)
                    .labels(y_labels),
            )
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            // Exit
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.should_exit = true;
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.should_exit = true;
            }

            // Tab switching
            (KeyCode::Tab, _) => {
                self.tab = match self.tab {
                    TuiTab::Calendar => TuiTab::Chart,
                    TuiTab::Chart => TuiTab::Calendar,
                };
            }
            (KeyCode::Char('1'), _) => self.tab = TuiTab::Calendar,
            (KeyCode::Char('2'), _) => self.tab = TuiTab::Chart,

            // Chart period
            (KeyCode::Char('p'), _) if self.tab == TuiTab::Chart => {
                self.period = self.period.next();
            }

            // Calendar navigation
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => {
                self.selected_date = self.selected_date - Duration::days(1);
                self.update_current_week();
            }
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
                self.selected_date = self.selected_date + Duration::days(1);
                self.update_current_week();
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.selected_date = self.selected_date - Duration::weeks(1);
                self.update_current_week();
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                self.selected_date = self.selected_date + Duration::weeks(1);
                self.update_current_week();
            }
            (KeyCode::PageUp, _) => {
                self.selected_date = self.selected_date - Duration::days(30);
                self.update_current_week();
            }
            (KeyCode::PageDown, _) => {
                self.selected_date = self.selected_date + Duration::days(30);
                self.update_current_week();
            }

            // Jump to today
            (KeyCode::Char('t'), _) => {
                self.selected_date = chrono::Local::now().date_naive();
                self.update_current_week();
            }

            // Toggle help
            (KeyCode::Char('?'), _) => {
                self.show_help = !self.show_help;
            }

            _ => {}
        }
    }

    fn update_current_week(&mut self) {
        let selected_week_start = Self::week_start(self.selected_date);
        if selected_week_start != self.current_week_start {
            self.current_week_start = selected_week_start;
        }
    }

    fn help_text(tab: TuiTab, selected_date: NaiveDate, theme: &Theme) -> Paragraph<'static> {
        let keys = match tab {
            TuiTab::Calendar => {
                "↑↓/jk=Week • ←→/hl=Day • PgUp/PgDn=Month • t=Today • Tab=Chart • ?=Help • q=Quit"
            }
            TuiTab::Chart => "p=Period • Tab=Calendar • ?=Help • q=Quit",
        };

        let help_text = vec![
            Line::from(vec![Span::styled(
                keys,
                Style::default().fg(theme.colors.dimmed),
            )]),
            Line::from(vec![Span::styled(
                format!("{}", selected_date.format("%A, %B %d, %Y")),
                Style::default().fg(theme.colors.focused),
            )]),
        ];

        Paragraph::new(help_text)
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Center)
    }

    /// Chart data for the current period: ascending (day, weight) points,
    /// x bounds and tick labels.
    fn chart_data(&self) -> (Vec<(f64, f64)>, [f64; 2], Vec<String>) {
        let today = chrono::Local::now().date_naive();
        let earliest = self.store.entries().last().map(|e| e.date);
        let axis = self.period.axis_range(today, earliest);

        // entries() is newest-first; the chart wants ascending x
        let points: Vec<(f64, f64)> = self
            .store
            .entries()
            .iter()
            .rev()
            .filter(|e| axis.contains(e.date))
            .map(|e| (f64::from(e.date.num_days_from_ce()), e.weight))
            .collect();

        let x_bounds = [
            f64::from(axis.start.num_days_from_ce()),
            f64::from(axis.end.num_days_from_ce()),
        ];

        let mid = axis.start + (axis.end - axis.start) / 2;
        let x_labels = vec![
            self.period.axis_label(axis.start),
            self.period.axis_label(mid),
            self.period.axis_label(axis.end),
        ];

        (points, x_bounds, x_labels)
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            if self.should_exit {
                break;
            }

            let weeks: Vec<NaiveDate> = (-2..=2)
                .map(|offset| self.current_week_start + Duration::weeks(offset))
                .collect();
            let recorded = self.recorded_days(&weeks);

            let selected_entry = self.store.existing_entry(self.selected_date).cloned();
            // Nearest older entry, for the delta line in the detail pane
            let previous_entry = self
                .store
                .entries()
                .iter()
                .find(|e| e.date < self.selected_date)
                .cloned();

            let (points, x_bounds, x_labels) = self.chart_data();
            let entry_count = points.len();

            let current_week_start = self.current_week_start;
            let selected_date = self.selected_date;
            let show_help = self.show_help;
            let tab = self.tab;
            let period = self.period;
            let theme = &self.theme;

            self.terminal.draw(|frame| {
                let size = frame.area();

                const CALENDAR_HEIGHT: u16 = 18;
                const DETAIL_HEIGHT: u16 = 5;
                const HELP_HEIGHT: u16 = 3;

                const MIN_WIDTH: u16 = 78;
                const MAX_WIDTH: u16 = 100;
                const PREFERRED_WIDTH: u16 = 86;

                let needed_width = if size.width >= MAX_WIDTH + 10 {
                    PREFERRED_WIDTH
                } else if size.width >= MIN_WIDTH + 4 {
                    std::cmp::min(size.width.saturating_sub(4), MAX_WIDTH)
                } else {
                    std::cmp::min(size.width, MIN_WIDTH)
                };

                let main_height = CALENDAR_HEIGHT + DETAIL_HEIGHT;
                let total_height = if show_help {
                    main_height + HELP_HEIGHT
                } else {
                    main_height
                };

                let centered = Self::calculate_centered_area(size, needed_width, total_height);

                let mut constraints = vec![
                    Constraint::Length(CALENDAR_HEIGHT),
                    Constraint::Length(DETAIL_HEIGHT),
                ];
                if show_help {
                    constraints.push(Constraint::Length(HELP_HEIGHT));
                }
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints(constraints)
                    .split(centered);

                match tab {
                    TuiTab::Calendar => {
                        let table = Self::calendar_table(
                            current_week_start,
                            selected_date,
                            theme,
                            &recorded,
                        );
                        frame.render_widget(table, chunks[0]);

                        let detail = Self::entry_display(
                            selected_entry.as_ref(),
                            previous_entry.as_ref(),
                            theme,
                        );
                        frame.render_widget(detail, chunks[1]);
                    }
                    TuiTab::Chart => {
                        if points.is_empty() {
                            let empty = Paragraph::new(vec![Line::from(vec![Span::styled(
                                "No data in this period".to_string(),
                                Style::default().fg(theme.colors.dimmed),
                            )])])
                            .block(
                                Block::default()
                                    .borders(Borders::NONE)
                                    .title(format!("Weight ({period})"))
                                    .title_style(Style::default().fg(theme.colors.header))
                                    .title_alignment(Alignment::Center),
                            )
                            .alignment(Alignment::Center);
                            frame.render_widget(empty, chunks[0]);
                        } else {
                            let chart = Self::chart_view(
                                &points,
                                x_bounds,
                                x_labels.clone(),
                                period,
                                theme,
                            );
                            frame.render_widget(chart, chunks[0]);
                        }

                        let summary = Paragraph::new(vec![Line::from(vec![Span::styled(
                            format!("{entry_count} entries shown"),
                            Style::default().fg(theme.colors.dimmed),
                        )])])
                        .alignment(Alignment::Center);
                        frame.render_widget(summary, chunks[1]);
                    }
                }

                if show_help {
                    let help = Self::help_text(tab, selected_date, theme);
                    frame.render_widget(help, chunks[2]);
                }
            })?;

            match poll(std::time::Duration::from_millis(100))? {
                true => match event::read()? {
                    Event::Key(key) => {
                        self.handle_key_event(key);
                    }
                    Event::Resize(_, _) => {
                        continue;
                    }
                    _ => {
                        continue;
                    }
                },
                false => {
                    continue;
                }
            }
        }

        self.cleanup()
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl<'a> Drop for TrackerTui<'a> {
    fn drop(&mut self) {
        // Fallback cleanup if run() never reached it
        let _ = self.cleanup();
    }
}
