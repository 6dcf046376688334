use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;

use crate::errors::Result;
use crate::pipeline::ImageReport;
use crate::shape_analysis::ParticleRecord;

/// Write the measurements of every retained particle to `<output_dir>/<stem>_particles.csv`
pub fn write_particle_csv<P: AsRef<Path>>(
    particles: &[ParticleRecord],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(format!("{}_particles.csv", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Particle_Index",
        "Area",
        "Perimeter",
        "Circularity",
        "Centroid_X",
        "Centroid_Y",
        "BBox_Min_X",
        "BBox_Min_Y",
        "BBox_Max_X",
        "BBox_Max_Y",
        "Vertex_Count",
    ])?;

    for particle in particles {
        writer.write_record(&[
            particle.index.to_string(),
            format!("{:.1}", particle.area),
            format!("{:.6}", particle.perimeter),
            format!("{:.6}", particle.circularity),
            format!("{:.3}", particle.centroid.0),
            format!("{:.3}", particle.centroid.1),
            particle.bounding_box.min_x.to_string(),
            particle.bounding_box.min_y.to_string(),
            particle.bounding_box.max_x.to_string(),
            particle.bounding_box.max_y.to_string(),
            particle.contour.len().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(output_path)
}

/// Outcome of one file in a batch, as written to the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Processed { particle_count: usize },
    Failed { reason: String },
}

/// Write one row per input file to `<output_dir>/summary.csv`
pub fn write_summary_csv<P: AsRef<Path>>(
    rows: &[(PathBuf, FileStatus)],
    output_dir: P,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join("summary.csv");
    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record(["File", "Status", "Particle_Count", "Error"])?;

    for (path, status) in rows {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match status {
            FileStatus::Processed { particle_count } => {
                writer.write_record(&[file, "ok".to_string(), particle_count.to_string(), String::new()])?;
            }
            FileStatus::Failed { reason } => {
                writer.write_record(&[file, "failed".to_string(), String::new(), reason.clone()])?;
            }
        }
    }

    writer.flush()?;
    Ok(output_path)
}

impl From<&ImageReport> for FileStatus {
    fn from(report: &ImageReport) -> Self {
        FileStatus::Processed {
            particle_count: report.particles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contours::Contour;
    use crate::shape_analysis::filter_by_area;

    #[test]
    fn particle_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let particles = filter_by_area(
            vec![
                Contour::from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]),
                Contour::from_coords(&[(20, 20), (25, 20), (25, 30), (20, 30)]),
            ],
            0.0,
            1000.0,
        );
        let path = write_particle_csv(&particles, dir.path(), "sample").unwrap();
        assert_eq!(path, dir.path().join("sample_particles.csv"));

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Particle_Index,Area"));
        assert!(lines[1].starts_with("0,100.0,"));
        assert!(lines[2].starts_with("1,50.0,"));
    }

    #[test]
    fn summary_lists_failures() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            (PathBuf::from("in/a.tif"), FileStatus::Processed { particle_count: 3 }),
            (PathBuf::from("in/b.tif"), FileStatus::Failed { reason: "corrupt".to_string() }),
        ];
        let path = write_summary_csv(&rows, dir.path()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("a.tif,ok,3,"));
        assert!(content.contains("b.tif,failed,,corrupt"));
    }
}
