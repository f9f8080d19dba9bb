use iced::widget::{button, column, container, pick_list, row, text, text_input, Row};
use iced::{Alignment, Element, Length};
use plancore::model::{
    AdditionalRooms, Direction, Quadrant, Requirements, VastuPreferences, BATHROOM_RANGE,
    BEDROOM_RANGE,
};
use std::fmt;
use std::ops::RangeInclusive;

/// A whole-number field that never leaves its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedCounter {
    value: u8,
    range: RangeInclusive<u8>,
}

impl BoundedCounter {
    pub fn new(value: u8, range: RangeInclusive<u8>) -> Self {
        let value = value.clamp(*range.start(), *range.end());
        Self { value, range }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn can_increment(&self) -> bool {
        self.value < *self.range.end()
    }

    pub fn can_decrement(&self) -> bool {
        self.value > *self.range.start()
    }

    pub fn increment(&mut self) {
        if self.can_increment() {
            self.value += 1;
        }
    }

    pub fn decrement(&mut self) {
        if self.can_decrement() {
            self.value -= 1;
        }
    }
}

/// Pick-list entry carrying its Vastu rating in the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice<T> {
    pub value: T,
    quality: &'static str,
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.quality)
    }
}

const fn choice<T>(value: T, quality: &'static str) -> Choice<T> {
    Choice { value, quality }
}

pub const KITCHEN_ORIENTATIONS: [Choice<Direction>; 4] = [
    choice(Direction::East, "Best"),
    choice(Direction::North, "Good"),
    choice(Direction::West, "Acceptable"),
    choice(Direction::South, "Avoid"),
];

pub const ENTRANCE_DIRECTIONS: [Choice<Direction>; 4] = [
    choice(Direction::North, "Most Auspicious"),
    choice(Direction::East, "Very Good"),
    choice(Direction::West, "Good"),
    choice(Direction::South, "Avoid if possible"),
];

pub const MASTER_BEDROOM_POSITIONS: [Choice<Quadrant>; 4] = [
    choice(Quadrant::Southwest, "Best"),
    choice(Quadrant::Northwest, "Good"),
    choice(Quadrant::Southeast, "Acceptable"),
    choice(Quadrant::Northeast, "Avoid"),
];

pub const KITCHEN_POSITIONS: [Choice<Quadrant>; 4] = [
    choice(Quadrant::Southeast, "Best"),
    choice(Quadrant::Northwest, "Good"),
    choice(Quadrant::Northeast, "Acceptable"),
    choice(Quadrant::Southwest, "Avoid"),
];

fn selected<T: PartialEq + Copy>(choices: &[Choice<T>], value: T) -> Option<Choice<T>> {
    choices.iter().copied().find(|choice| choice.value == value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Bedrooms,
    Bathrooms,
}

#[derive(Debug, Clone)]
pub enum RequirementsMessage {
    Increment(Counter),
    Decrement(Counter),
    KitchenOrientation(Direction),
    Entrance(Direction),
    MasterBedroom(Quadrant),
    KitchenPosition(Quadrant),
    TogglePujaRoom,
    NewRoomChanged(String),
    AddRoom,
    RemoveRoom(String),
    Back,
    Submit,
}

pub enum Action {
    None,
    Back,
    Submit(Requirements),
}

#[derive(Debug, Clone)]
pub struct RequirementsForm {
    bedrooms: BoundedCounter,
    bathrooms: BoundedCounter,
    kitchen_orientation: Direction,
    vastu: VastuPreferences,
    rooms: AdditionalRooms,
    new_room: String,
}

impl Default for RequirementsForm {
    fn default() -> Self {
        Self::from_requirements(Requirements::default())
    }
}

impl RequirementsForm {
    pub fn from_requirements(requirements: Requirements) -> Self {
        Self {
            bedrooms: BoundedCounter::new(requirements.bedrooms, BEDROOM_RANGE),
            bathrooms: BoundedCounter::new(requirements.bathrooms, BATHROOM_RANGE),
            kitchen_orientation: requirements.kitchen_orientation,
            vastu: requirements.vastu_preferences,
            rooms: requirements.additional_rooms,
            new_room: String::new(),
        }
    }

    pub fn requirements(&self) -> Requirements {
        Requirements {
            bedrooms: self.bedrooms.value(),
            bathrooms: self.bathrooms.value(),
            kitchen_orientation: self.kitchen_orientation,
            vastu_preferences: self.vastu.clone(),
            additional_rooms: self.rooms.clone(),
        }
    }

    fn counter(&mut self, counter: Counter) -> &mut BoundedCounter {
        match counter {
            Counter::Bedrooms => &mut self.bedrooms,
            Counter::Bathrooms => &mut self.bathrooms,
        }
    }

    pub fn update(&mut self, message: RequirementsMessage) -> Action {
        match message {
            RequirementsMessage::Increment(counter) => self.counter(counter).increment(),
            RequirementsMessage::Decrement(counter) => self.counter(counter).decrement(),
            RequirementsMessage::KitchenOrientation(direction) => {
                self.kitchen_orientation = direction
            }
            RequirementsMessage::Entrance(direction) => self.vastu.entrance_direction = direction,
            RequirementsMessage::MasterBedroom(quadrant) => {
                self.vastu.master_bedroom_position = quadrant
            }
            RequirementsMessage::KitchenPosition(quadrant) => {
                self.vastu.kitchen_position = quadrant
            }
            RequirementsMessage::TogglePujaRoom => self.vastu.puja_room = !self.vastu.puja_room,
            RequirementsMessage::NewRoomChanged(value) => self.new_room = value,
            RequirementsMessage::AddRoom => {
                if self.rooms.add(&self.new_room) {
                    self.new_room.clear();
                }
            }
            RequirementsMessage::RemoveRoom(name) => {
                self.rooms.remove(&name);
            }
            RequirementsMessage::Back => return Action::Back,
            RequirementsMessage::Submit => return Action::Submit(self.requirements()),
        }
        Action::None
    }

    pub fn view(&self) -> Element<'_, RequirementsMessage> {
        let basics = column![
            text("Basic Requirements").size(20),
            counter_row("Number of Bedrooms", &self.bedrooms, Counter::Bedrooms),
            counter_row("Number of Bathrooms", &self.bathrooms, Counter::Bathrooms),
            labelled(
                "Kitchen Orientation",
                pick_list(
                    &KITCHEN_ORIENTATIONS[..],
                    selected(&KITCHEN_ORIENTATIONS, self.kitchen_orientation),
                    |choice| RequirementsMessage::KitchenOrientation(choice.value),
                )
                .into(),
            ),
        ]
        .spacing(10);

        let puja_label = if self.vastu.puja_room {
            "[x] Include Puja Room (Northeast preferred)"
        } else {
            "[ ] Include Puja Room (Northeast preferred)"
        };
        let vastu = column![
            text("Vastu Preferences").size(20),
            labelled(
                "Main Entrance Direction",
                pick_list(
                    &ENTRANCE_DIRECTIONS[..],
                    selected(&ENTRANCE_DIRECTIONS, self.vastu.entrance_direction),
                    |choice| RequirementsMessage::Entrance(choice.value),
                )
                .into(),
            ),
            labelled(
                "Master Bedroom Position",
                pick_list(
                    &MASTER_BEDROOM_POSITIONS[..],
                    selected(&MASTER_BEDROOM_POSITIONS, self.vastu.master_bedroom_position),
                    |choice| RequirementsMessage::MasterBedroom(choice.value),
                )
                .into(),
            ),
            labelled(
                "Kitchen Position",
                pick_list(
                    &KITCHEN_POSITIONS[..],
                    selected(&KITCHEN_POSITIONS, self.vastu.kitchen_position),
                    |choice| RequirementsMessage::KitchenPosition(choice.value),
                )
                .into(),
            ),
            button(text(puja_label).size(14))
                .on_press(RequirementsMessage::TogglePujaRoom)
                .style(button::text),
        ]
        .spacing(10);

        let chips = self.rooms.iter().fold(Row::new().spacing(8), |chips, room| {
            chips.push(
                container(
                    row![
                        text(room.to_string()).size(14),
                        button(text("x").size(12))
                            .on_press(RequirementsMessage::RemoveRoom(room.to_string()))
                            .style(button::text)
                            .padding(2),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                )
                .padding([2, 8])
                .style(container::rounded_box),
            )
        });
        let rooms = column![
            text("Additional Rooms").size(20),
            row![
                text_input("Add room (e.g., Study, Guest Room)", &self.new_room)
                    .on_input(RequirementsMessage::NewRoomChanged)
                    .on_submit(RequirementsMessage::AddRoom)
                    .padding(6),
                button("Add").on_press(RequirementsMessage::AddRoom),
            ]
            .spacing(8),
            chips.wrap(),
        ]
        .spacing(10);

        let navigation = row![
            button("Back")
                .on_press(RequirementsMessage::Back)
                .style(button::secondary)
                .padding(10),
            button("Generate Floor Plan")
                .on_press(RequirementsMessage::Submit)
                .padding(10),
        ]
        .spacing(16);

        column![
            text("Floor Plan Requirements").size(26),
            text("Specify your requirements and Vastu preferences for the perfect floor plan")
                .size(14),
            card(basics.into()),
            card(vastu.into()),
            card(rooms.into()),
            navigation,
        ]
        .spacing(14)
        .padding(16)
        .max_width(760.0)
        .into()
    }
}

fn card(content: Element<'_, RequirementsMessage>) -> Element<'_, RequirementsMessage> {
    container(content)
        .padding(14)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn labelled<'a>(
    label: &'a str,
    control: Element<'a, RequirementsMessage>,
) -> Element<'a, RequirementsMessage> {
    row![text(label).size(14).width(Length::Fill), control]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}

fn counter_row<'a>(
    label: &'a str,
    counter: &BoundedCounter,
    which: Counter,
) -> Element<'a, RequirementsMessage> {
    labelled(
        label,
        row![
            button(text("-").size(16))
                .on_press_maybe(
                    counter
                        .can_decrement()
                        .then_some(RequirementsMessage::Decrement(which))
                )
                .style(button::secondary),
            text(counter.value().to_string()).size(16).width(Length::Fixed(28.0)),
            button(text("+").size(16))
                .on_press_maybe(
                    counter
                        .can_increment()
                        .then_some(RequirementsMessage::Increment(which))
                )
                .style(button::secondary),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_saturate_at_bounds() {
        let mut bedrooms = BoundedCounter::new(6, BEDROOM_RANGE);
        assert!(!bedrooms.can_increment());
        bedrooms.increment();
        assert_eq!(bedrooms.value(), 6);

        let mut bedrooms = BoundedCounter::new(2, BEDROOM_RANGE);
        bedrooms.decrement();
        bedrooms.decrement();
        assert_eq!(bedrooms.value(), 1);
        assert!(!bedrooms.can_decrement());
        assert_eq!(BoundedCounter::new(0, BEDROOM_RANGE).value(), 1);

        let mut bathrooms = BoundedCounter::new(3, BATHROOM_RANGE);
        bathrooms.increment();
        bathrooms.increment();
        assert_eq!(bathrooms.value(), 4);
        assert!(!bathrooms.can_increment());

        let mut bathrooms = BoundedCounter::new(2, BATHROOM_RANGE);
        bathrooms.decrement();
        bathrooms.decrement();
        bathrooms.decrement();
        assert_eq!(bathrooms.value(), 1);
        assert!(!bathrooms.can_decrement());

        assert_eq!(BoundedCounter::new(9, BATHROOM_RANGE).value(), 4);
    }

    #[test]
    fn form_starts_from_defaults() {
        let form = RequirementsForm::default();
        assert_eq!(form.requirements(), Requirements::default());
    }

    #[test]
    fn adding_rooms_clears_input_only_on_success() {
        let mut form = RequirementsForm::default();
        form.update(RequirementsMessage::NewRoomChanged("  Study ".into()));
        form.update(RequirementsMessage::AddRoom);
        assert!(form.new_room.is_empty());
        assert!(form.rooms.contains("Study"));

        form.update(RequirementsMessage::NewRoomChanged("Study".into()));
        form.update(RequirementsMessage::AddRoom);
        assert_eq!(form.new_room, "Study");
        assert_eq!(form.rooms.len(), 3);

        form.update(RequirementsMessage::NewRoomChanged("   ".into()));
        form.update(RequirementsMessage::AddRoom);
        assert_eq!(form.rooms.len(), 3);

        form.update(RequirementsMessage::RemoveRoom("Living Room".into()));
        assert_eq!(
            form.requirements().additional_rooms.iter().collect::<Vec<_>>(),
            vec!["Dining Room", "Study"]
        );
    }

    #[test]
    fn submit_emits_the_complete_record() {
        let mut form = RequirementsForm::default();
        form.update(RequirementsMessage::Increment(Counter::Bedrooms));
        form.update(RequirementsMessage::Decrement(Counter::Bathrooms));
        form.update(RequirementsMessage::Entrance(Direction::East));
        form.update(RequirementsMessage::KitchenPosition(Quadrant::Northwest));
        form.update(RequirementsMessage::TogglePujaRoom);

        match form.update(RequirementsMessage::Submit) {
            Action::Submit(requirements) => {
                assert_eq!(requirements.bedrooms, 4);
                assert_eq!(requirements.bathrooms, 1);
                assert_eq!(
                    requirements.vastu_preferences.entrance_direction,
                    Direction::East
                );
                assert_eq!(
                    requirements.vastu_preferences.kitchen_position,
                    Quadrant::Northwest
                );
                assert!(requirements.vastu_preferences.puja_room);
            }
            _ => panic!("expected submit"),
        }
        assert!(matches!(
            form.update(RequirementsMessage::Back),
            Action::Back
        ));
    }

    #[test]
    fn choices_carry_vastu_quality() {
        assert_eq!(
            ENTRANCE_DIRECTIONS[0].to_string(),
            "North (Most Auspicious)"
        );
        assert_eq!(
            selected(&KITCHEN_POSITIONS, Quadrant::Southwest).map(|c| c.to_string()),
            Some("Southwest (Avoid)".to_string())
        );
    }
}
