use std::str::FromStr;

/// Reference transcript set used by the upstream annotator, which decides the
/// suffix of the gene-based INFO fields (e.g. `Func.refGene`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptSet {
    #[default]
    RefGene,
    RefGeneWithVer,
}

impl TranscriptSet {
    pub fn suffix(&self) -> &'static str {
        match self {
            TranscriptSet::RefGene => "refGene",
            TranscriptSet::RefGeneWithVer => "refGeneWithVer",
        }
    }

    pub fn func_key(&self) -> String {
        format!("Func.{}", self.suffix())
    }

    pub fn exonic_func_key(&self) -> String {
        format!("ExonicFunc.{}", self.suffix())
    }
}

impl FromStr for TranscriptSet {
    type Err = &'static str;
    fn from_str(transcript_set: &str) -> Result<Self, Self::Err> {
        match transcript_set {
            "refgene" => Ok(TranscriptSet::RefGene),
            "refgene-with-ver" => Ok(TranscriptSet::RefGeneWithVer),
            _ => Err("Invalid transcript set. Options are: refgene, refgene-with-ver"),
        }
    }
}
