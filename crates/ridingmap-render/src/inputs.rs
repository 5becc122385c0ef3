//! Latest-value inputs that drive a [`MapView`](crate::MapView).

use lyon::math::Box2D;
use ridingmap_core::{latest, Color, LatestReceiver, LatestSender};

use crate::geometry::Shape;

/// Consumer side of every map input, read by the render thread.
#[derive(Debug)]
pub struct MapInputs {
    pub shapes: LatestReceiver<Vec<(Shape, Color)>>,
    pub focus: LatestReceiver<Option<Box2D>>,
    pub outline: LatestReceiver<Vec<Shape>>,
    pub header: LatestReceiver<String>,
    pub border_color: LatestReceiver<Option<Color>>,
    pub size: LatestReceiver<(u32, u32)>,
}

impl MapInputs {
    /// True when any input has an unconsumed value.
    pub fn has_pending(&self) -> bool {
        self.shapes.has_pending()
            || self.focus.has_pending()
            || self.outline.has_pending()
            || self.header.has_pending()
            || self.border_color.has_pending()
            || self.size.has_pending()
    }

    /// Install one wake-up callback on every input.
    pub fn set_notifier<F>(&self, notify: F)
    where
        F: Fn() + Clone + Send + Sync + 'static,
    {
        self.shapes.set_notifier(notify.clone());
        self.focus.set_notifier(notify.clone());
        self.outline.set_notifier(notify.clone());
        self.header.set_notifier(notify.clone());
        self.border_color.set_notifier(notify.clone());
        self.size.set_notifier(notify);
    }
}

/// Producer side of every map input. Clone freely across threads.
#[derive(Clone)]
pub struct MapPublishers {
    pub shapes: LatestSender<Vec<(Shape, Color)>>,
    pub focus: LatestSender<Option<Box2D>>,
    pub outline: LatestSender<Vec<Shape>>,
    pub header: LatestSender<String>,
    pub border_color: LatestSender<Option<Color>>,
    pub size: LatestSender<(u32, u32)>,
}

/// Create connected publishers and inputs for one map view.
pub fn map_bindings() -> (MapPublishers, MapInputs) {
    let (shapes_tx, shapes_rx) = latest();
    let (focus_tx, focus_rx) = latest();
    let (outline_tx, outline_rx) = latest();
    let (header_tx, header_rx) = latest();
    let (border_tx, border_rx) = latest();
    let (size_tx, size_rx) = latest();
    (
        MapPublishers {
            shapes: shapes_tx,
            focus: focus_tx,
            outline: outline_tx,
            header: header_tx,
            border_color: border_tx,
            size: size_tx,
        },
        MapInputs {
            shapes: shapes_rx,
            focus: focus_rx,
            outline: outline_rx,
            header: header_rx,
            border_color: border_rx,
            size: size_rx,
        },
    )
}
