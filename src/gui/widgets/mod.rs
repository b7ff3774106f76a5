use iced::{
    Color, Element, Font, Length, Point, Rectangle, Renderer, Theme, font, mouse,
    widget::{canvas, column, container, row, text},
};

use crate::models::Severity;

const INDICATOR_SIZE: f32 = 70.0;
const INDICATOR_RADIUS: f32 = 25.0;

pub fn severity_color(severity: Severity) -> Color {
    let [r, g, b] = severity.rgb();
    Color::from_rgb8(r, g, b)
}

/// 50x50 circle filled with the severity color; nothing drawn before a score exists
#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    severity: Option<Severity>,
}

impl<Message> canvas::Program<Message> for Indicator {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let Some(severity) = self.severity else {
            return Vec::new();
        };

        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let circle = canvas::Path::circle(center, INDICATOR_RADIUS);
        frame.fill(&circle, severity_color(severity));
        frame.stroke(
            &circle,
            canvas::Stroke::default().with_color(Color::BLACK).with_width(1.0),
        );
        vec![frame.into_geometry()]
    }
}

pub fn indicator<'a, Message: 'a>(severity: Option<Severity>) -> Element<'a, Message> {
    canvas(Indicator { severity })
        .width(Length::Fixed(INDICATOR_SIZE))
        .height(Length::Fixed(INDICATOR_SIZE))
        .into()
}

/// Bold status message in the severity color
pub fn status_label<'a, Message: 'a>(severity: Option<Severity>) -> Element<'a, Message> {
    let Some(severity) = severity else {
        return text("").size(16).into();
    };

    text(severity.message())
        .size(16)
        .font(Font {
            weight: font::Weight::Bold,
            ..Font::DEFAULT
        })
        .color(severity_color(severity))
        .into()
}

pub fn layout<'a, Message>(
    left: impl Into<Element<'a, Message>>,
    right: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(
        row![
            container(column![left.into()]).padding(10),
            container(column![right.into()]).padding(10),
        ]
        .spacing(20),
    )
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}
