use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};
use plancore::model::{Opening, PixelBox, ProcessedPlot, WallLine};

/// Pixel-space overlay of what the backend detected in the plot image.
#[derive(Debug, Clone)]
pub struct PlotCanvas {
    plot: PixelBox,
    rooms: Vec<PixelBox>,
    walls: Vec<WallLine>,
    openings: Vec<Opening>,
}

impl PlotCanvas {
    pub fn new(processed: &ProcessedPlot) -> Self {
        Self {
            plot: processed.plot_bbox_px,
            rooms: processed.layout.iter().map(|room| room.bbox_px).collect(),
            walls: processed.wall_lines.clone(),
            openings: processed.openings.clone(),
        }
    }

    /// Far corner of everything drawn, so nothing falls off the canvas.
    fn extent(&self) -> (f64, f64) {
        let boxes = std::iter::once(self.plot)
            .chain(self.rooms.iter().copied())
            .chain(self.openings.iter().map(opening_box));
        let (mut right, mut bottom) = boxes.fold((1.0_f64, 1.0_f64), |(r, b), bbox| {
            (r.max(bbox.x + bbox.w), b.max(bbox.y + bbox.h))
        });
        for wall in &self.walls {
            right = right.max(wall.x1).max(wall.x2);
            bottom = bottom.max(wall.y1).max(wall.y2);
        }
        (right, bottom)
    }
}

fn opening_box(opening: &Opening) -> PixelBox {
    PixelBox {
        x: opening.x,
        y: opening.y,
        w: opening.w,
        h: opening.h,
    }
}

struct Projection {
    scale: f32,
    margin: f32,
}

impl Projection {
    fn fit(extent: (f64, f64), bounds: Size) -> Self {
        let margin = 8.0;
        let scale_x = (bounds.width - 2.0 * margin) / extent.0 as f32;
        let scale_y = (bounds.height - 2.0 * margin) / extent.1 as f32;
        Self {
            scale: scale_x.min(scale_y).max(0.0),
            margin,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.margin + x as f32 * self.scale,
            self.margin + y as f32 * self.scale,
        )
    }

    fn rect(&self, bbox: PixelBox) -> (Point, Size) {
        (
            self.point(bbox.x, bbox.y),
            Size::new(bbox.w as f32 * self.scale, bbox.h as f32 * self.scale),
        )
    }
}

impl<Message> canvas::Program<Message> for PlotCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.03, 0.03, 0.05),
        );

        let projection = Projection::fit(self.extent(), bounds.size());

        let (origin, size) = projection.rect(self.plot);
        frame.stroke(
            &Path::rectangle(origin, size),
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
        );

        for room in &self.rooms {
            let (origin, size) = projection.rect(*room);
            let path = Path::rectangle(origin, size);
            frame.fill(&path, Color::from_rgba(0.3, 0.8, 0.45, 0.18));
            frame.stroke(
                &path,
                Stroke::default().with_color(Color::from_rgb(0.3, 0.8, 0.45)),
            );
        }

        if !self.walls.is_empty() {
            let walls = Path::new(|builder| {
                for wall in &self.walls {
                    builder.move_to(projection.point(wall.x1, wall.y1));
                    builder.line_to(projection.point(wall.x2, wall.y2));
                }
            });
            frame.stroke(
                &walls,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.85, 0.85, 0.9)),
            );
        }

        for opening in &self.openings {
            let (origin, size) = projection.rect(opening_box(opening));
            frame.fill_rectangle(origin, size, Color::from_rgb(0.95, 0.55, 0.2));
        }

        vec![frame.into_geometry()]
    }
}
