//! HDF5 datasets and histogram output.
//!
//! A dataset file holds one group per partition (`DF_*`), each with one
//! subgroup per table and one 1-D dataset per column. Histogram files hold
//! one group per histogram category with one dataset per histogram; the
//! binning, flows and entry count are stored as dataset attributes.

use crate::sink::{stored_groups, HistogramSink, StoredAxis, StoredGroups, StoredHistogram};
use crate::source::{
    is_partition_name, missing_table, DatasetSource, COLLISION_TABLE, DEBUG_TABLE, PARTICLE_TABLE,
};
use crate::{Error, Result};
use femtopost_core::{CollisionTable, HistogramSet, ParticleDebugTable, ParticleTable, Partition};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::{ArrayView1, ArrayView2};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FORMAT_VERSION: &str = "0.1";

/// A dataset stored in an HDF5 file.
///
/// The file is reopened for every call so that partitions can be loaded
/// from several threads.
#[derive(Debug, Clone)]
pub struct Hdf5Dataset {
    path: PathBuf,
}

impl Hdf5Dataset {
    /// Opens an HDF5 dataset.
    ///
    /// # Errors
    /// Returns an error if the file is not a readable HDF5 file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        File::open(&path)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for Hdf5Dataset {
    fn partition_names(&self) -> Result<Vec<String>> {
        let file = File::open(&self.path)?;
        let mut names = file.member_names()?;
        names.retain(|name| is_partition_name(name));
        Ok(names)
    }

    fn load_partition(&self, name: &str) -> Result<Option<Partition>> {
        let file = File::open(&self.path)?;
        if !file.link_exists(name) {
            return Err(Error::UnknownPartition(name.to_string()));
        }
        let group = file.group(name)?;
        for table in [COLLISION_TABLE, PARTICLE_TABLE, DEBUG_TABLE] {
            if !group.link_exists(table) {
                missing_table(name, table);
                return Ok(None);
            }
        }
        let collisions = read_collisions(&group.group(COLLISION_TABLE)?)?;
        let particles = read_particles(&group.group(PARTICLE_TABLE)?)?;
        let debug = read_debug(&group.group(DEBUG_TABLE)?)?;
        Ok(Some(Partition::new(name, collisions, particles, debug)?))
    }
}

fn read_collisions(group: &Group) -> Result<CollisionTable> {
    Ok(CollisionTable {
        pos_z: read_dataset_vec(group, "fPosZ")?,
        mult_v0m: read_dataset_vec(group, "fMultV0M")?,
    })
}

fn read_particles(group: &Group) -> Result<ParticleTable> {
    Ok(ParticleTable {
        pt: read_dataset_vec(group, "fPt")?,
        eta: read_dataset_vec(group, "fEta")?,
        phi: read_dataset_vec(group, "fPhi")?,
        part_type: read_dataset_vec(group, "fPartType")?,
        temp_fit_var: read_dataset_vec(group, "fTempFitVar")?,
        collision_index: read_dataset_vec(group, "fIndexFemtoDreamCollisions")?,
        m_lambda: read_dataset_vec(group, "fMLambda")?,
    })
}

fn read_debug(group: &Group) -> Result<ParticleDebugTable> {
    Ok(ParticleDebugTable {
        sign: read_dataset_vec(group, "fSign")?,
        tpc_ncls_found: read_dataset_vec(group, "fTPCNClsFound")?,
        tpc_ncls_findable: read_dataset_vec(group, "fTPCNClsFindable")?,
        tpc_ncls_crossed_rows: read_dataset_vec(group, "fTPCNClsCrossedRows")?,
        tpc_ncls_shared: read_dataset_vec(group, "fTPCNClsShared")?,
        its_ncls: read_dataset_vec(group, "fITSNCls")?,
        its_ncls_inner_barrel: read_dataset_vec(group, "fITSNClsInnerBarrel")?,
        dca_xy: read_dataset_vec(group, "fDcaXY")?,
        dca_z: read_dataset_vec(group, "fDcaZ")?,
        daugh_dca: read_dataset_vec(group, "fDaughDCA")?,
        trans_radius: read_dataset_vec(group, "fTransRadius")?,
        decay_vtx_x: read_dataset_vec(group, "fDecayVtxX")?,
        decay_vtx_y: read_dataset_vec(group, "fDecayVtxY")?,
        decay_vtx_z: read_dataset_vec(group, "fDecayVtxZ")?,
        m_kaon: read_dataset_vec(group, "fMKaon")?,
        tpc_nsigma_el: read_dataset_vec(group, "fTPCNSigmaStoreEl")?,
        tpc_nsigma_pi: read_dataset_vec(group, "fTPCNSigmaStorePi")?,
        tpc_nsigma_pr: read_dataset_vec(group, "fTPCNSigmaStorePr")?,
        tpc_nsigma_de: read_dataset_vec(group, "fTPCNSigmaStoreDe")?,
        tof_nsigma_el: read_dataset_vec(group, "fTOFNSigmaStoreEl")?,
        tof_nsigma_pi: read_dataset_vec(group, "fTOFNSigmaStorePi")?,
        tof_nsigma_pr: read_dataset_vec(group, "fTOFNSigmaStorePr")?,
        tof_nsigma_de: read_dataset_vec(group, "fTOFNSigmaStoreDe")?,
    })
}

/// Writes partitions as an HDF5 dataset readable by [`Hdf5Dataset`].
///
/// # Errors
/// Returns an error if HDF5 I/O fails.
pub fn write_hdf5_dataset<P: AsRef<Path>>(path: P, partitions: &[Partition]) -> Result<()> {
    let file = File::create(path)?;
    set_attr_str_file(&file, "femtopost_format_version", FORMAT_VERSION)?;
    for partition in partitions {
        let group = file.create_group(partition.name())?;

        let cols = group.create_group(COLLISION_TABLE)?;
        let c = partition.collisions();
        write_column(&cols, "fPosZ", &c.pos_z)?;
        write_column(&cols, "fMultV0M", &c.mult_v0m)?;

        let parts = group.create_group(PARTICLE_TABLE)?;
        let p = partition.particles();
        write_column(&parts, "fPt", &p.pt)?;
        write_column(&parts, "fEta", &p.eta)?;
        write_column(&parts, "fPhi", &p.phi)?;
        write_column(&parts, "fPartType", &p.part_type)?;
        write_column(&parts, "fTempFitVar", &p.temp_fit_var)?;
        write_column(&parts, "fIndexFemtoDreamCollisions", &p.collision_index)?;
        write_column(&parts, "fMLambda", &p.m_lambda)?;

        let dbg = group.create_group(DEBUG_TABLE)?;
        let d = partition.debug();
        write_column(&dbg, "fSign", &d.sign)?;
        write_column(&dbg, "fTPCNClsFound", &d.tpc_ncls_found)?;
        write_column(&dbg, "fTPCNClsFindable", &d.tpc_ncls_findable)?;
        write_column(&dbg, "fTPCNClsCrossedRows", &d.tpc_ncls_crossed_rows)?;
        write_column(&dbg, "fTPCNClsShared", &d.tpc_ncls_shared)?;
        write_column(&dbg, "fITSNCls", &d.its_ncls)?;
        write_column(&dbg, "fITSNClsInnerBarrel", &d.its_ncls_inner_barrel)?;
        write_column(&dbg, "fDcaXY", &d.dca_xy)?;
        write_column(&dbg, "fDcaZ", &d.dca_z)?;
        write_column(&dbg, "fDaughDCA", &d.daugh_dca)?;
        write_column(&dbg, "fTransRadius", &d.trans_radius)?;
        write_column(&dbg, "fDecayVtxX", &d.decay_vtx_x)?;
        write_column(&dbg, "fDecayVtxY", &d.decay_vtx_y)?;
        write_column(&dbg, "fDecayVtxZ", &d.decay_vtx_z)?;
        write_column(&dbg, "fMKaon", &d.m_kaon)?;
        write_column(&dbg, "fTPCNSigmaStoreEl", &d.tpc_nsigma_el)?;
        write_column(&dbg, "fTPCNSigmaStorePi", &d.tpc_nsigma_pi)?;
        write_column(&dbg, "fTPCNSigmaStorePr", &d.tpc_nsigma_pr)?;
        write_column(&dbg, "fTPCNSigmaStoreDe", &d.tpc_nsigma_de)?;
        write_column(&dbg, "fTOFNSigmaStoreEl", &d.tof_nsigma_el)?;
        write_column(&dbg, "fTOFNSigmaStorePi", &d.tof_nsigma_pi)?;
        write_column(&dbg, "fTOFNSigmaStorePr", &d.tof_nsigma_pr)?;
        write_column(&dbg, "fTOFNSigmaStoreDe", &d.tof_nsigma_de)?;
    }
    Ok(())
}

/// Writes histograms into an HDF5 file.
pub struct Hdf5HistogramSink {
    file: File,
    compression: Option<u8>,
}

impl Hdf5HistogramSink {
    /// Creates (or truncates) the output file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        set_attr_str_file(&file, "femtopost_format_version", FORMAT_VERSION)?;
        Ok(Self {
            file,
            compression: None,
        })
    }

    /// Enables deflate compression of histogram contents.
    #[must_use]
    pub fn with_compression(mut self, level: u8) -> Self {
        self.compression = Some(level);
        self
    }
}

impl HistogramSink for Hdf5HistogramSink {
    fn write(&mut self, set: &HistogramSet) -> Result<()> {
        for (group_name, hists) in stored_groups(set) {
            let group = self.file.create_group(&group_name)?;
            for (name, hist) in &hists {
                write_histogram(&group, name, hist, self.compression)?;
            }
        }
        self.file.flush()?;
        Ok(())
    }
}

fn write_histogram(
    group: &Group,
    name: &str,
    hist: &StoredHistogram,
    compression: Option<u8>,
) -> Result<()> {
    match hist {
        StoredHistogram::TH1 {
            axis,
            contents,
            underflow,
            overflow,
            entries,
        } => {
            let dataset = create_fixed_dataset::<f64, _>(group, name, axis.bins, compression)?;
            dataset.write(ArrayView1::from(contents.as_slice()))?;
            set_attr_str(&dataset, "kind", "TH1")?;
            set_axis_attrs(&dataset, "", axis)?;
            set_attr(&dataset, "underflow", *underflow)?;
            set_attr(&dataset, "overflow", *overflow)?;
            set_attr(&dataset, "entries", *entries)?;
        }
        StoredHistogram::TH2 {
            x,
            y,
            contents,
            entries,
        } => {
            let view = ArrayView2::from_shape((x.bins, y.bins), contents.as_slice())
                .map_err(|e| Error::InvalidFormat(format!("{name}: {e}")))?;
            let dataset =
                create_fixed_dataset::<f64, _>(group, name, (x.bins, y.bins), compression)?;
            dataset.write(view)?;
            set_attr_str(&dataset, "kind", "TH2")?;
            set_axis_attrs(&dataset, "x_", x)?;
            set_axis_attrs(&dataset, "y_", y)?;
            set_attr(&dataset, "entries", *entries)?;
        }
    }
    Ok(())
}

/// Reads histograms written by [`Hdf5HistogramSink`].
///
/// # Errors
/// Returns an error if HDF5 I/O fails or a histogram lacks its attributes.
pub fn read_hdf5_histograms<P: AsRef<Path>>(path: P) -> Result<StoredGroups> {
    let file = File::open(path)?;
    let mut groups = StoredGroups::new();
    for group_name in file.member_names()? {
        let group = file.group(&group_name)?;
        let mut hists = BTreeMap::new();
        for name in group.member_names()? {
            let dataset = group.dataset(&name)?;
            hists.insert(name, read_histogram(&dataset)?);
        }
        groups.insert(group_name, hists);
    }
    Ok(groups)
}

fn read_histogram(dataset: &Dataset) -> Result<StoredHistogram> {
    let kind: VarLenUnicode = dataset.attr("kind")?.read_scalar()?;
    let contents = dataset.read_raw::<f64>()?;
    let entries = dataset.attr("entries")?.read_scalar::<u64>()?;
    match kind.as_str() {
        "TH1" => Ok(StoredHistogram::TH1 {
            axis: read_axis_attrs(dataset, "")?,
            contents,
            underflow: dataset.attr("underflow")?.read_scalar()?,
            overflow: dataset.attr("overflow")?.read_scalar()?,
            entries,
        }),
        "TH2" => Ok(StoredHistogram::TH2 {
            x: read_axis_attrs(dataset, "x_")?,
            y: read_axis_attrs(dataset, "y_")?,
            contents,
            entries,
        }),
        other => Err(Error::InvalidFormat(format!(
            "{}: unknown histogram kind {other}",
            dataset.name()
        ))),
    }
}

fn set_axis_attrs(dataset: &Dataset, prefix: &str, axis: &StoredAxis) -> Result<()> {
    set_attr(dataset, &format!("{prefix}bins"), axis.bins as u64)?;
    set_attr(dataset, &format!("{prefix}min"), axis.min)?;
    set_attr(dataset, &format!("{prefix}max"), axis.max)
}

fn read_axis_attrs(dataset: &Dataset, prefix: &str) -> Result<StoredAxis> {
    let bins = dataset
        .attr(&format!("{prefix}bins"))?
        .read_scalar::<u64>()?;
    Ok(StoredAxis {
        bins: usize::try_from(bins)
            .map_err(|_| Error::InvalidFormat(format!("{prefix}bins out of range: {bins}")))?,
        min: dataset.attr(&format!("{prefix}min"))?.read_scalar()?,
        max: dataset.attr(&format!("{prefix}max"))?.read_scalar()?,
    })
}

fn write_column<T: H5Type>(group: &Group, name: &str, data: &[T]) -> Result<()> {
    let dataset = create_fixed_dataset::<T, _>(group, name, data.len(), None)?;
    if !data.is_empty() {
        dataset.write(ArrayView1::from(data))?;
    }
    Ok(())
}

fn create_fixed_dataset<T: H5Type, S>(
    group: &Group,
    name: &str,
    shape: S,
    compression: Option<u8>,
) -> Result<Dataset>
where
    S: Into<hdf5::Extents>,
{
    let mut builder = group.new_dataset::<T>().shape(shape);

    if let Some(level) = compression {
        builder = builder.deflate(level);
    }

    Ok(builder.create(name)?)
}

fn set_attr<T: H5Type>(dataset: &Dataset, name: &str, value: T) -> Result<()> {
    dataset.new_attr::<T>().create(name)?.write_scalar(&value)?;
    Ok(())
}

fn set_attr_str(dataset: &Dataset, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    dataset
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str_file(file: &File, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    file.new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn read_dataset_vec<T: H5Type>(group: &Group, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    Ok(dataset.read_raw::<T>()?)
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}
