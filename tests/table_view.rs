use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use prodview::columns::ColumnKey;
use prodview::controller::Controller;
use prodview::domain::{Message, TableConfig};
use prodview::model::Model;
use prodview::product::Product;
use prodview::state::{SortDirection, TableState};
use prodview::ui::{HANDLE_SYMBOL_ACTIVE, IMAGE_SYMBOL, TableUI};

const WIDTH: u16 = 200;
const HEIGHT: u16 = 20;
const CHECKBOX_LINE: u16 = 1;
const HEADER_LINE: u16 = 3;
const FIRST_ROW_LINE: u16 = 4;

struct Harness {
    terminal: Terminal<TestBackend>,
    ui: TableUI,
    controller: Controller,
    model: Model,
}

impl Harness {
    fn new(names: &[&str]) -> Self {
        Self::sized(names, WIDTH, HEIGHT)
    }

    fn sized(names: &[&str], width: u16, height: u16) -> Self {
        let config = TableConfig::default().with_cell_px(3);
        let products = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Product {
                id: format!("{}", idx + 1),
                name: name.to_string(),
                price: format!("${}.00", idx + 1),
                quality: (idx + 1) as f64,
                description: format!("Fresh {}", name.to_lowercase()),
                image_url: format!("https://img.example/{}.png", idx + 1),
            })
            .collect();
        let model = Model::init(
            &config,
            "products.csv",
            products,
            TableState::default(),
            usize::from(width),
            usize::from(height),
        );
        Self {
            terminal: Terminal::new(TestBackend::new(width, height)).expect("test terminal"),
            ui: TableUI::new(&config),
            controller: Controller::new(&config),
            model,
        }
    }

    fn draw(&mut self) -> Buffer {
        let Harness {
            terminal, ui, model, ..
        } = self;
        terminal.draw(|f| ui.draw(model, f)).expect("draw");
        terminal.backend().buffer().clone()
    }

    fn send(&mut self, message: Message) {
        self.model.update(Some(message));
    }

    fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let event = Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
        let message = self
            .controller
            .map_event(event, &self.model, self.ui.layout());
        self.model.update(message);
    }
}

fn line(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn row_names(buffer: &Buffer, names: &[&str]) -> Vec<String> {
    (FIRST_ROW_LINE..FIRST_ROW_LINE + names.len() as u16)
        .filter_map(|y| {
            let text = line(buffer, y);
            names
                .iter()
                .find(|name| text.contains(*name))
                .map(|name| name.to_string())
        })
        .collect()
}

#[test]
fn default_render_is_sorted_by_name() {
    let names = ["Banana", "Apple", "Cherry"];
    let mut harness = Harness::new(&names);
    let buffer = harness.draw();
    assert_eq!(row_names(&buffer, &names), vec!["Apple", "Banana", "Cherry"]);
    assert!(line(&buffer, HEADER_LINE).contains("Name ▲"));
}

#[test]
fn hiding_and_showing_price() {
    let names = ["Banana", "Apple", "Cherry"];
    let mut harness = Harness::new(&names);
    let buffer = harness.draw();
    let header = line(&buffer, HEADER_LINE);
    assert!(header.contains("Price"));
    assert!(line(&buffer, FIRST_ROW_LINE).contains("$2.00"));

    harness.send(Message::ToggleVisibility(ColumnKey::Price));
    let buffer = harness.draw();
    let hidden = line(&buffer, HEADER_LINE);
    assert!(!hidden.contains("Price"));
    for label in ["ID", "Name", "Quality", "Description", "Image"] {
        assert!(hidden.contains(label), "{label} still shown");
    }
    for y in FIRST_ROW_LINE..FIRST_ROW_LINE + 3 {
        assert!(!line(&buffer, y).contains('$'));
    }
    assert!(line(&buffer, CHECKBOX_LINE).contains("[ ] price"));

    harness.send(Message::ToggleVisibility(ColumnKey::Price));
    let buffer = harness.draw();
    assert_eq!(line(&buffer, HEADER_LINE), header);
    assert!(line(&buffer, FIRST_ROW_LINE).contains("$2.00"));
}

#[test]
fn name_checkbox_is_inert() {
    let names = ["Banana"];
    let mut harness = Harness::new(&names);
    let buffer = harness.draw();
    assert!(line(&buffer, CHECKBOX_LINE).contains("[x] name"));

    // "[x] id" occupies columns 1..7, "[x] name" starts at 9
    harness.mouse(MouseEventKind::Down(MouseButton::Left), 10, CHECKBOX_LINE);
    let buffer = harness.draw();
    assert!(line(&buffer, CHECKBOX_LINE).contains("[x] name"));
    assert!(line(&buffer, HEADER_LINE).contains("Name"));
}

#[test]
fn clicking_headers_cycles_sort() {
    let names = ["Banana", "Apple", "Cherry"];
    let mut harness = Harness::new(&names);
    harness.draw();

    // Quality header spans columns 74..84 (1 + 10 + 1 + 50 + 1 + 10 + 1)
    let quality_x = 76;
    harness.mouse(MouseEventKind::Down(MouseButton::Left), quality_x, HEADER_LINE);
    let buffer = harness.draw();
    assert!(line(&buffer, HEADER_LINE).contains("Quality ▲"));
    assert!(!line(&buffer, HEADER_LINE).contains("Name ▲"));
    assert_eq!(row_names(&buffer, &names), vec!["Banana", "Apple", "Cherry"]);

    harness.mouse(MouseEventKind::Down(MouseButton::Left), quality_x, HEADER_LINE);
    let buffer = harness.draw();
    assert!(line(&buffer, HEADER_LINE).contains("Quality ▼"));
    assert_eq!(row_names(&buffer, &names), vec!["Cherry", "Apple", "Banana"]);

    harness.mouse(MouseEventKind::Down(MouseButton::Left), quality_x, HEADER_LINE);
    let buffer = harness.draw();
    assert!(!line(&buffer, HEADER_LINE).contains('▲'));
    assert!(!line(&buffer, HEADER_LINE).contains('▼'));
}

#[test]
fn dragging_a_handle_resizes_without_sorting() {
    let names = ["Banana", "Apple"];
    let mut harness = Harness::new(&names);
    harness.draw();

    let handle = harness
        .ui
        .layout()
        .columns
        .iter()
        .find(|c| c.key == ColumnKey::Price)
        .and_then(|c| c.handle)
        .expect("price has a handle");
    let before = harness.model.state().width(ColumnKey::Price);

    harness.mouse(MouseEventKind::Down(MouseButton::Left), handle.x, handle.y);
    assert_eq!(harness.model.state().resizing(), Some(ColumnKey::Price));
    let sort = harness.model.state().sort().expect("sorted");
    assert_eq!(sort.key, ColumnKey::Name);
    assert_eq!(sort.direction, SortDirection::Ascending);

    let buffer = harness.draw();
    assert_eq!(buffer[(handle.x, handle.y)].symbol(), HANDLE_SYMBOL_ACTIVE);

    harness.mouse(MouseEventKind::Drag(MouseButton::Left), handle.x + 2, handle.y);
    assert_eq!(
        harness.model.state().width(ColumnKey::Price),
        before.map(|w| w + 6)
    );
    harness.draw();
    let moved = harness
        .ui
        .layout()
        .columns
        .iter()
        .find(|c| c.key == ColumnKey::Price)
        .and_then(|c| c.handle)
        .expect("price has a handle");
    assert_eq!(moved.x, handle.x + 2);

    // released far away from the handle
    harness.mouse(MouseEventKind::Up(MouseButton::Left), 100, 15);
    assert_eq!(harness.model.state().resizing(), None);
    harness.mouse(MouseEventKind::Drag(MouseButton::Left), handle.x + 10, handle.y);
    assert_eq!(
        harness.model.state().width(ColumnKey::Price),
        before.map(|w| w + 6)
    );
}

#[test]
fn image_cells_show_a_marker() {
    let names = ["Apple"];
    let mut harness = Harness::new(&names);
    let buffer = harness.draw();
    let row = line(&buffer, FIRST_ROW_LINE);
    assert!(row.contains(&format!("{IMAGE_SYMBOL} https")));
}

#[test]
fn same_state_renders_the_same() {
    let names = ["Banana", "Apple", "Cherry"];
    let mut harness = Harness::new(&names);
    let first = harness.draw();
    let second = harness.draw();
    assert_eq!(first, second);
}

#[test]
fn help_popup() {
    let names = ["Apple"];
    let mut harness = Harness::new(&names);
    harness.send(Message::Help);
    let buffer = harness.draw();
    let screen: String = (0..HEIGHT).map(|y| line(&buffer, y)).collect();
    assert!(screen.contains("Help"));
    assert!(screen.contains("toggle sort of the selected column"));

    harness.send(Message::Exit);
    let buffer = harness.draw();
    let screen: String = (0..HEIGHT).map(|y| line(&buffer, y)).collect();
    assert!(!screen.contains("toggle sort of the selected column"));
}

#[test]
fn low_terminals_render() {
    let names = ["Banana", "Apple", "Cherry"];
    for height in 1..=4 {
        let mut harness = Harness::sized(&names, 80, height);
        let buffer = harness.draw();
        assert_eq!(buffer.area.height, height);
        harness.send(Message::MoveDown);
        harness.send(Message::Help);
        harness.draw();
    }
    let mut harness = Harness::sized(&names, 80, 4);
    let buffer = harness.draw();
    assert!(line(&buffer, CHECKBOX_LINE).contains("[x] id"));
}

#[test]
fn narrow_terminals_render() {
    let names = ["Banana", "Apple", "Cherry"];
    for width in 1..=12 {
        let mut harness = Harness::sized(&names, width, 8);
        harness.draw();
        harness.send(Message::ScrollRight);
        harness.draw();
    }
}

#[test]
fn shrinking_the_terminal_keeps_rendering() {
    let names = ["Banana", "Apple", "Cherry"];
    let mut harness = Harness::new(&names);
    harness.draw();
    harness.terminal.backend_mut().resize(30, 3);
    harness.send(Message::Resize(30, 3));
    let buffer = harness.draw();
    assert_eq!((buffer.area.width, buffer.area.height), (30, 3));
}

#[test]
fn checkboxes_wrap_in_a_narrow_terminal() {
    let names = ["Banana", "Apple"];
    let mut harness = Harness::sized(&names, 40, HEIGHT);
    let buffer = harness.draw();
    // 38 inner columns: id name price | quality description | image
    assert!(line(&buffer, 1).contains("[x] price"));
    assert!(line(&buffer, 2).contains("[x] quality"));
    assert!(line(&buffer, 3).contains("[x] image"));
    assert!(line(&buffer, 5).contains("Name"));
    assert!(line(&buffer, 6).contains("Apple"));

    harness.send(Message::ToggleVisibilityNth(5));
    let buffer = harness.draw();
    assert!(line(&buffer, 3).contains("[ ] image"));

    // the wrapped checkbox is still there to show the column again
    harness.mouse(MouseEventKind::Down(MouseButton::Left), 2, 3);
    assert!(harness.model.state().is_visible(ColumnKey::Image));
    let buffer = harness.draw();
    assert!(line(&buffer, 3).contains("[x] image"));
}
