use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use plotters::prelude::*;

const SIZE: (u32, u32) = (800, 600);

/// Draws the train and test accuracy of every epoch as two lines.
///
/// # Arguments
/// * `train_acc` - The train accuracy per epoch.
/// * `test_acc` - The test accuracy per epoch.
/// * `name` - The dataset name, used as the title and file name.
/// * `dir` - The output directory, created if it doesn't exist.
///
/// # Returns
/// The path of the written `<name>_loss.svg` file.
pub fn accuracy_curve(
    train_acc: &[f32],
    test_acc: &[f32],
    name: &str,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{name}_loss.svg"));

    draw(&path, train_acc, test_acc, name)
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}

fn draw(
    path: &Path,
    train_acc: &[f32],
    test_acc: &[f32],
    name: &str,
) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(name, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-3f32..303f32, 0.5f32..1f32)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Accuracy")
        .draw()?;

    for (label, acc, color) in [("Train acc", train_acc, BLUE), ("Test acc", test_acc, RED)] {
        chart
            .draw_series(LineSeries::new(
                acc.iter().enumerate().map(|(epoch, &a)| (epoch as f32, a)),
                &color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn writes_an_svg_in_a_new_directory() {
        let dir = env::temp_dir()
            .join(format!("sgc-plot-{}", std::process::id()))
            .join("nested");
        let _ = fs::remove_dir_all(&dir);

        let path = accuracy_curve(&[0.6, 0.7, 0.8], &[0.55, 0.65, 0.75], "pubmed", &dir).unwrap();

        assert_eq!(path, dir.join("pubmed_loss.svg"));
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Train acc"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
