//! Walk a tiny synthetic page through the full reduction pipeline and
//! print what survives.

use anyhow::Result;
use tracing::info;

use syrinx_common::config::ReduceConfig;
use syrinx_common::geom::{Line, Point, Rect};
use syrinx_common::scale::Scale;
use syrinx_graph::{
    BeamPortion, HorizontalSide, Inter, Payload, RelationData, Shape, Support, SupportKind,
};
use syrinx_reduce::{Mode, Page};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut page = Page::new(ReduceConfig::default());
    let system = page.add_system(Rect::new(0.0, 0.0, 600.0, 160.0), Scale::new(20));

    // A beamed pair of eighth notes
    let stem1 = page
        .add_inter(
            system,
            Inter::new(Shape::Stem, 0.7, Rect::new(100.0, 20.0, 3.0, 44.0)).with_payload(
                Payload::Stem {
                    median: Line::new(Point::new(101.5, 20.0), Point::new(101.5, 64.0)),
                },
            ),
        )
        .unwrap();
    let stem2 = page
        .add_inter(
            system,
            Inter::new(Shape::Stem, 0.7, Rect::new(160.0, 20.0, 3.0, 44.0)).with_payload(
                Payload::Stem {
                    median: Line::new(Point::new(161.5, 20.0), Point::new(161.5, 64.0)),
                },
            ),
        )
        .unwrap();
    let head1 = page
        .add_inter(
            system,
            Inter::new(Shape::NoteheadBlack, 0.75, Rect::new(104.0, 54.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 4 }),
        )
        .unwrap();
    let head2 = page
        .add_inter(
            system,
            Inter::new(Shape::NoteheadBlack, 0.7, Rect::new(164.0, 54.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 2 }),
        )
        .unwrap();
    let beam = page
        .add_inter(
            system,
            Inter::new(Shape::Beam, 0.8, Rect::new(100.0, 20.0, 64.0, 6.0)).with_payload(
                Payload::Beam {
                    median: Line::new(Point::new(100.0, 23.0), Point::new(164.0, 23.0)),
                    height: 6.0,
                },
            ),
        )
        .unwrap();

    // Noise the reduction should clean up
    let stray_head = page
        .add_inter(
            system,
            Inter::new(Shape::NoteheadBlack, 0.9, Rect::new(300.0, 40.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 0 }),
        )
        .unwrap();
    let stray_hook = page
        .add_inter(
            system,
            Inter::new(Shape::BeamHook, 0.6, Rect::new(340.0, 20.0, 20.0, 6.0)),
        )
        .unwrap();

    {
        let sig = &mut page.system_mut(system).unwrap().sig;
        for (head, stem) in [(head1, stem1), (head2, stem2)] {
            sig.add_relation(
                head,
                stem,
                RelationData::Support(Support::new(
                    SupportKind::HeadStem {
                        head_side: HorizontalSide::Right,
                        extension_y: 63.0,
                    },
                    0.5,
                )),
            )?;
        }
        for (stem, portion) in [(stem1, BeamPortion::Left), (stem2, BeamPortion::Right)] {
            sig.add_relation(
                beam,
                stem,
                RelationData::Support(Support::new(SupportKind::BeamStem { portion }, 0.6)),
            )?;
        }
    }

    info!(
        inters = page.system(system).unwrap().sig.live_inter_count(),
        "page populated"
    );

    let outcome = page.reduce(Mode::Foundations, true);
    info!(removed = outcome.removed[0].1.len(), "foundations pass");

    let outcome = page.reduce(Mode::Links, true);
    info!(removed = outcome.removed[0].1.len(), "links pass");

    let sig = &page.system(system).unwrap().sig;
    println!("surviving candidates:");
    for id in sig.live_inters() {
        let inter = sig.get(id).unwrap();
        println!(
            "  {id} {:?} grade {:.2} contextual {:.2}",
            inter.shape,
            inter.grade(),
            inter.best_grade(),
        );
    }

    assert!(sig.contains(beam));
    assert!(!sig.contains(stray_head));
    assert!(!sig.contains(stray_hook));

    Ok(())
}
