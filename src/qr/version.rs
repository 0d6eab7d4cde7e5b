//! QR versions 1..=40
//!
//! Each version fixes the matrix dimension (17 + 4V), the alignment
//! pattern centers, and per error-correction level the Reed-Solomon block
//! structure. The tables transcribe ISO/IEC 18004 tables 9 and E.1.

use crate::common::BitMatrix;
use crate::qr::format_info::{calculate_bch_code, ErrorCorrectionLevel, VERSION_GENERATOR};
use crate::{Error, Result};

/// One group of identically-sized RS blocks: `count` blocks carrying
/// `data_codewords` data bytes each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlockGroup {
    pub count: usize,
    pub data_codewords: usize,
}

/// RS block structure for one (version, level) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlocks {
    /// EC bytes appended to every block.
    pub ec_codewords_per_block: usize,
    pub groups: &'static [EcBlockGroup],
}

impl EcBlocks {
    pub fn num_blocks(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn total_data_codewords(&self) -> usize {
        self.groups.iter().map(|g| g.count * g.data_codewords).sum()
    }

    pub fn total_ec_codewords(&self) -> usize {
        self.num_blocks() * self.ec_codewords_per_block
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Version {
    number: u32,
    alignment_centers: &'static [usize],
    ec_blocks: [EcBlocks; 4],
}

impl Version {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn dimension(&self) -> usize {
        17 + 4 * self.number as usize
    }

    pub fn alignment_centers(&self) -> &'static [usize] {
        self.alignment_centers
    }

    pub fn ec_blocks(&self, level: ErrorCorrectionLevel) -> &EcBlocks {
        &self.ec_blocks[level.ordinal()]
    }

    pub fn total_codewords(&self) -> usize {
        let blocks = &self.ec_blocks[0];
        blocks.total_data_codewords() + blocks.total_ec_codewords()
    }

    pub fn by_number(number: u32) -> Result<&'static Version> {
        VERSIONS
            .get(number.wrapping_sub(1) as usize)
            .ok_or(Error::InvalidArgument("version out of range 1..=40"))
    }

    /// Provisional version from a sampled dimension (must be 4k+1 in
    /// 21..=177).
    pub fn for_dimension(dimension: usize) -> Result<&'static Version> {
        if !(21..=177).contains(&dimension) {
            return Err(Error::Format("dimension out of range"));
        }
        if dimension % 4 != 1 {
            return Err(Error::Format("dimension is not 4k+1"));
        }
        Self::by_number(((dimension - 17) / 4) as u32)
            .map_err(|_| Error::Format("dimension out of range"))
    }

    /// Decode an 18-bit version info word, tolerating up to 3 bit errors.
    pub fn decode_version_info(raw: u32) -> Option<&'static Version> {
        let mut best: Option<(u32, u32)> = None;
        for number in 7..=40u32 {
            let codeword = (number << 12) | calculate_bch_code(number, VERSION_GENERATOR);
            if codeword == raw {
                return Self::by_number(number).ok();
            }
            let distance = (raw ^ codeword).count_ones();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, number));
            }
        }
        match best {
            Some((distance, number)) if distance <= 3 => Self::by_number(number).ok(),
            _ => None,
        }
    }

    /// Mask of the function-pattern cells (finders, separators, timing,
    /// alignment, format and version info areas). The codeword walk skips
    /// every set cell.
    pub fn build_function_pattern(&self) -> BitMatrix {
        let dimension = self.dimension();
        let mut mask = BitMatrix::square(dimension);

        // Finders with separators, plus the format info strips beside them.
        mask.set_region(0, 0, 9, 9);
        mask.set_region(dimension - 8, 0, 8, 9);
        mask.set_region(0, dimension - 8, 9, 8);

        // Alignment patterns, skipping any that sit on a finder.
        let centers = self.alignment_centers;
        for &cy in centers {
            for &cx in centers {
                let on_finder = (cx < 9 && cy < 9)
                    || (cx >= dimension - 9 && cy < 9)
                    || (cx < 9 && cy >= dimension - 9);
                if !on_finder {
                    mask.set_region(cx - 2, cy - 2, 5, 5);
                }
            }
        }

        // Timing patterns.
        mask.set_region(6, 9, 1, dimension - 17);
        mask.set_region(9, 6, dimension - 17, 1);

        if self.number > 6 {
            mask.set_region(dimension - 11, 0, 3, 6);
            mask.set_region(0, dimension - 11, 6, 3);
        }

        mask
    }
}

macro_rules! ec {
    ($per_block:expr, $(($count:expr, $data:expr)),+) => {
        EcBlocks {
            ec_codewords_per_block: $per_block,
            groups: &[$(EcBlockGroup { count: $count, data_codewords: $data }),+],
        }
    };
}

macro_rules! version {
    ($n:expr, [$($center:expr),*], $l:expr, $m:expr, $q:expr, $h:expr) => {
        Version {
            number: $n,
            alignment_centers: &[$($center),*],
            ec_blocks: [$l, $m, $q, $h],
        }
    };
}

static VERSIONS: [Version; 40] = [
    version!(1, [], ec!(7, (1, 19)), ec!(10, (1, 16)), ec!(13, (1, 13)), ec!(17, (1, 9))),
    version!(2, [6, 18], ec!(10, (1, 34)), ec!(16, (1, 28)), ec!(22, (1, 22)), ec!(28, (1, 16))),
    version!(3, [6, 22], ec!(15, (1, 55)), ec!(26, (1, 44)), ec!(18, (2, 17)), ec!(22, (2, 13))),
    version!(4, [6, 26], ec!(20, (1, 80)), ec!(18, (2, 32)), ec!(26, (2, 24)), ec!(16, (4, 9))),
    version!(5, [6, 30], ec!(26, (1, 108)), ec!(24, (2, 43)), ec!(18, (2, 15), (2, 16)), ec!(22, (2, 11), (2, 12))),
    version!(6, [6, 34], ec!(18, (2, 68)), ec!(16, (4, 27)), ec!(24, (4, 19)), ec!(28, (4, 15))),
    version!(7, [6, 22, 38], ec!(20, (2, 78)), ec!(18, (4, 31)), ec!(18, (2, 14), (4, 15)), ec!(26, (4, 13), (1, 14))),
    version!(8, [6, 24, 42], ec!(24, (2, 97)), ec!(22, (2, 38), (2, 39)), ec!(22, (4, 18), (2, 19)), ec!(26, (4, 14), (2, 15))),
    version!(9, [6, 26, 46], ec!(30, (2, 116)), ec!(22, (3, 36), (2, 37)), ec!(20, (4, 16), (4, 17)), ec!(24, (4, 12), (4, 13))),
    version!(10, [6, 28, 50], ec!(18, (2, 68), (2, 69)), ec!(26, (4, 43), (1, 44)), ec!(24, (6, 19), (2, 20)), ec!(28, (6, 15), (2, 16))),
    version!(11, [6, 30, 54], ec!(20, (4, 81)), ec!(30, (1, 50), (4, 51)), ec!(28, (4, 22), (4, 23)), ec!(24, (3, 12), (8, 13))),
    version!(12, [6, 32, 58], ec!(24, (2, 92), (2, 93)), ec!(22, (6, 36), (2, 37)), ec!(26, (4, 20), (6, 21)), ec!(28, (7, 14), (4, 15))),
    version!(13, [6, 34, 62], ec!(26, (4, 107)), ec!(22, (8, 37), (1, 38)), ec!(24, (8, 20), (4, 21)), ec!(22, (12, 11), (4, 12))),
    version!(14, [6, 26, 46, 66], ec!(30, (3, 115), (1, 116)), ec!(24, (4, 40), (5, 41)), ec!(20, (11, 16), (5, 17)), ec!(24, (11, 12), (5, 13))),
    version!(15, [6, 26, 48, 70], ec!(22, (5, 87), (1, 88)), ec!(24, (5, 41), (5, 42)), ec!(30, (5, 24), (7, 25)), ec!(24, (11, 12), (7, 13))),
    version!(16, [6, 26, 50, 74], ec!(24, (5, 98), (1, 99)), ec!(28, (7, 45), (3, 46)), ec!(24, (15, 19), (2, 20)), ec!(30, (3, 15), (13, 16))),
    version!(17, [6, 30, 54, 78], ec!(28, (1, 107), (5, 108)), ec!(28, (10, 46), (1, 47)), ec!(28, (1, 22), (15, 23)), ec!(28, (2, 14), (17, 15))),
    version!(18, [6, 30, 56, 82], ec!(30, (5, 120), (1, 121)), ec!(26, (9, 43), (4, 44)), ec!(28, (17, 22), (1, 23)), ec!(28, (2, 14), (19, 15))),
    version!(19, [6, 30, 58, 86], ec!(28, (3, 113), (4, 114)), ec!(26, (3, 44), (11, 45)), ec!(26, (17, 21), (4, 22)), ec!(26, (9, 13), (16, 14))),
    version!(20, [6, 34, 62, 90], ec!(28, (3, 107), (5, 108)), ec!(26, (3, 41), (13, 42)), ec!(30, (15, 24), (5, 25)), ec!(28, (15, 15), (10, 16))),
    version!(21, [6, 28, 50, 72, 94], ec!(28, (4, 116), (4, 117)), ec!(26, (17, 42)), ec!(28, (17, 22), (6, 23)), ec!(30, (19, 16), (6, 17))),
    version!(22, [6, 26, 50, 74, 98], ec!(28, (2, 111), (7, 112)), ec!(28, (17, 46)), ec!(30, (7, 24), (16, 25)), ec!(24, (34, 13))),
    version!(23, [6, 30, 54, 78, 102], ec!(30, (4, 121), (5, 122)), ec!(28, (4, 47), (14, 48)), ec!(30, (11, 24), (14, 25)), ec!(30, (16, 15), (14, 16))),
    version!(24, [6, 28, 54, 80, 106], ec!(30, (6, 117), (4, 118)), ec!(28, (6, 45), (14, 46)), ec!(30, (11, 24), (16, 25)), ec!(30, (30, 16), (2, 17))),
    version!(25, [6, 32, 58, 84, 110], ec!(26, (8, 106), (4, 107)), ec!(28, (8, 47), (13, 48)), ec!(30, (7, 24), (22, 25)), ec!(30, (22, 15), (13, 16))),
    version!(26, [6, 30, 58, 86, 114], ec!(28, (10, 114), (2, 115)), ec!(28, (19, 46), (4, 47)), ec!(28, (28, 22), (6, 23)), ec!(30, (33, 16), (4, 17))),
    version!(27, [6, 34, 62, 90, 118], ec!(30, (8, 122), (4, 123)), ec!(28, (22, 45), (3, 46)), ec!(30, (8, 23), (26, 24)), ec!(30, (12, 15), (28, 16))),
    version!(28, [6, 26, 50, 74, 98, 122], ec!(30, (3, 117), (10, 118)), ec!(28, (3, 45), (23, 46)), ec!(30, (4, 24), (31, 25)), ec!(30, (11, 15), (31, 16))),
    version!(29, [6, 30, 54, 78, 102, 126], ec!(30, (7, 116), (7, 117)), ec!(28, (21, 45), (7, 46)), ec!(30, (1, 23), (37, 24)), ec!(30, (19, 15), (26, 16))),
    version!(30, [6, 26, 52, 78, 104, 130], ec!(30, (5, 115), (10, 116)), ec!(28, (19, 47), (10, 48)), ec!(30, (15, 24), (25, 25)), ec!(30, (23, 15), (25, 16))),
    version!(31, [6, 30, 56, 82, 108, 134], ec!(30, (13, 115), (3, 116)), ec!(28, (2, 46), (29, 47)), ec!(30, (42, 24), (1, 25)), ec!(30, (23, 15), (28, 16))),
    version!(32, [6, 34, 60, 86, 112, 138], ec!(30, (17, 115)), ec!(28, (10, 46), (23, 47)), ec!(30, (10, 24), (35, 25)), ec!(30, (19, 15), (35, 16))),
    version!(33, [6, 30, 58, 86, 114, 142], ec!(30, (17, 115), (1, 116)), ec!(28, (14, 46), (21, 47)), ec!(30, (29, 24), (19, 25)), ec!(30, (11, 15), (46, 16))),
    version!(34, [6, 34, 62, 90, 118, 146], ec!(30, (13, 115), (6, 116)), ec!(28, (14, 46), (23, 47)), ec!(30, (44, 24), (7, 25)), ec!(30, (59, 16), (1, 17))),
    version!(35, [6, 30, 54, 78, 102, 126, 150], ec!(30, (12, 121), (7, 122)), ec!(28, (12, 47), (26, 48)), ec!(30, (39, 24), (14, 25)), ec!(30, (22, 15), (41, 16))),
    version!(36, [6, 24, 50, 76, 102, 128, 154], ec!(30, (6, 121), (14, 122)), ec!(28, (6, 47), (34, 48)), ec!(30, (46, 24), (10, 25)), ec!(30, (2, 15), (64, 16))),
    version!(37, [6, 28, 54, 80, 106, 132, 158], ec!(30, (17, 122), (4, 123)), ec!(28, (29, 46), (14, 47)), ec!(30, (49, 24), (10, 25)), ec!(30, (24, 15), (46, 16))),
    version!(38, [6, 32, 58, 84, 110, 136, 162], ec!(30, (4, 122), (18, 123)), ec!(28, (13, 46), (32, 47)), ec!(30, (48, 24), (14, 25)), ec!(30, (42, 15), (32, 16))),
    version!(39, [6, 26, 54, 82, 110, 138, 166], ec!(30, (20, 117), (4, 118)), ec!(28, (40, 47), (7, 48)), ec!(30, (43, 24), (22, 25)), ec!(30, (10, 15), (67, 16))),
    version!(40, [6, 30, 58, 86, 114, 142, 170], ec!(30, (19, 118), (6, 119)), ec!(28, (18, 47), (34, 48)), ec!(30, (34, 24), (20, 25)), ec!(30, (20, 15), (61, 16))),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_and_lookup() {
        assert_eq!(Version::by_number(1).unwrap().dimension(), 21);
        assert_eq!(Version::by_number(40).unwrap().dimension(), 177);
        assert!(Version::by_number(0).is_err());
        assert!(Version::by_number(41).is_err());
        assert_eq!(Version::for_dimension(25).unwrap().number(), 2);
        assert!(Version::for_dimension(24).is_err());
    }

    #[test]
    fn total_codewords_consistent_across_levels() {
        // Every level of a version must account for the same total.
        for version in &VERSIONS {
            let total = version.total_codewords();
            for level in [
                ErrorCorrectionLevel::L,
                ErrorCorrectionLevel::M,
                ErrorCorrectionLevel::Q,
                ErrorCorrectionLevel::H,
            ] {
                let blocks = version.ec_blocks(level);
                assert_eq!(
                    blocks.total_data_codewords() + blocks.total_ec_codewords(),
                    total,
                    "version {} level {}",
                    version.number(),
                    level.name()
                );
            }
        }
    }

    #[test]
    fn known_block_structures() {
        let v1 = Version::by_number(1).unwrap();
        assert_eq!(v1.total_codewords(), 26);
        let v1h = v1.ec_blocks(ErrorCorrectionLevel::H);
        assert_eq!(v1h.num_blocks(), 1);
        assert_eq!(v1h.total_data_codewords(), 9);
        assert_eq!(v1h.total_ec_codewords(), 17);

        let v7h = Version::by_number(7).unwrap().ec_blocks(ErrorCorrectionLevel::H);
        assert_eq!(v7h.num_blocks(), 5);
        assert_eq!(Version::by_number(7).unwrap().total_codewords(), 196);

        let v27l = Version::by_number(27).unwrap().ec_blocks(ErrorCorrectionLevel::L);
        assert_eq!(v27l.total_data_codewords(), 1468);

        let v40h = Version::by_number(40).unwrap().ec_blocks(ErrorCorrectionLevel::H);
        assert_eq!(v40h.num_blocks(), 81);
        assert_eq!(v40h.total_data_codewords(), 1276);
        assert_eq!(Version::by_number(40).unwrap().total_codewords(), 3706);
    }

    #[test]
    fn codeword_totals_match_matrix_area() {
        // Data area = modules not covered by function patterns; each
        // codeword is 8 modules, with up to 7 remainder bits.
        for version in &VERSIONS {
            let pattern = version.build_function_pattern();
            let dimension = version.dimension();
            let mut free = 0usize;
            for y in 0..dimension {
                for x in 0..dimension {
                    if !pattern.get(x, y) {
                        free += 1;
                    }
                }
            }
            let codewords = version.total_codewords();
            assert!(
                free >= codewords * 8 && free < codewords * 8 + 8,
                "version {}: {} free modules for {} codewords",
                version.number(),
                free,
                codewords
            );
        }
    }

    #[test]
    fn version_info_decoding() {
        assert_eq!(Version::decode_version_info(0x07C94).unwrap().number(), 7);
        assert_eq!(Version::decode_version_info(0x28C69).unwrap().number(), 40);
        // Three bit errors.
        assert_eq!(
            Version::decode_version_info(0x07C94 ^ 0b1011).unwrap().number(),
            7
        );
        // Hopeless garbage.
        assert!(Version::decode_version_info(0x3FFFF ^ 0x2AAAA).is_none());
    }

    #[test]
    fn alignment_centers_sane() {
        for version in &VERSIONS {
            let centers = version.alignment_centers();
            if version.number() == 1 {
                assert!(centers.is_empty());
                continue;
            }
            assert_eq!(centers.first(), Some(&6));
            assert_eq!(*centers.last().unwrap(), version.dimension() - 7);
        }
    }
}
