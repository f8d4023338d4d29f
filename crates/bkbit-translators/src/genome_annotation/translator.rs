//! GFF3 to genome annotation JSON-LD
//!
//! The content URL determines the authority and release; the taxonomy lookup
//! supplies organism names. Gene rows are translated as they stream by and
//! kept in file order.

use super::download::{download_gff_file, DownloadedFile};
use super::gff3::{get_attribute, open_gff3, split_values, Attributes, FeatureRows};
use super::url::parse_url;
use crate::models::genome_annotation::{
    AuthorityType, BioType, Checksum, DigestType, GeneAnnotation, GenomeAnnotation, GenomeAssembly,
    OrganismTaxon,
};
use crate::taxonomy::TaxonomyLookup;
use anyhow::{anyhow, bail, Context, Result};
use bkbit_common::checksum::{DigestAlgorithm, DigestValues};
use bkbit_common::jsonld::{JsonLdDocument, GENOME_ANNOTATION_CONTEXT};
use bkbit_common::object_id::assign_object_id;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

pub const NCBI_GENE_ID_PREFIX: &str = "NCBIGene:";
pub const ENSEMBL_GENE_ID_PREFIX: &str = "ENSEMBL:";
pub const TAXON_PREFIX: &str = "NCBITaxon:";
pub const TAXON_IRI_PREFIX: &str = "http://purl.obolibrary.org/obo/NCBITaxon_";
pub const ASSEMBLY_PREFIX: &str = "NCBIAssembly:";
pub const BICAN_ANNOTATION_PREFIX: &str = "bican:annotation-";

/// Feature types translated into gene annotations
pub const DEFAULT_FEATURE_FILTER: &[&str] = &["gene", "pseudogene", "ncRNA_gene"];

#[derive(Debug, Clone)]
pub struct Gff3Options {
    /// Required for Ensembl URLs, which do not carry the accession
    pub assembly_accession: Option<String>,
    pub assembly_strain: Option<String>,
    pub hash_functions: Vec<DigestAlgorithm>,
    pub feature_filter: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Default for Gff3Options {
    fn default() -> Self {
        Self {
            assembly_accession: None,
            assembly_strain: None,
            hash_functions: vec![DigestAlgorithm::Md5],
            feature_filter: DEFAULT_FEATURE_FILTER.iter().map(|s| s.to_string()).collect(),
            timeout: None,
        }
    }
}

pub struct GenomeAnnotationTranslator {
    content_url: String,
    feature_filter: Vec<String>,
    organism_taxon: OrganismTaxon,
    genome_assembly: GenomeAssembly,
    checksums: Vec<Checksum>,
    genome_annotation: GenomeAnnotation,
    gene_annotations: Vec<GeneAnnotation>,
    /// GeneID (NCBI) or object id (Ensembl) to position in `gene_annotations`
    gene_index: HashMap<String, usize>,
}

fn build<T: DeserializeOwned>(attributes: Value) -> Result<T> {
    let Value::Object(map) = attributes else {
        bail!("attributes must be an object");
    };
    Ok(serde_json::from_value(Value::Object(assign_object_id(map)))?)
}

impl GenomeAnnotationTranslator {
    /// Build the metadata objects for an already downloaded file
    pub fn new(
        content_url: &str,
        options: &Gff3Options,
        taxonomy: &TaxonomyLookup,
        digests: &DigestValues,
    ) -> Result<Self> {
        let metadata = parse_url(content_url).ok_or_else(|| {
            anyhow!("The provided content URL is not supported. Please provide a valid URL.")
        })?;
        let authority = metadata.authority;

        let (taxon_id, assembly_accession) = match authority {
            AuthorityType::Ncbi => (
                metadata.taxon_id.clone().context("NCBI URL without taxon id")?,
                metadata
                    .assembly_accession
                    .clone()
                    .context("NCBI URL without assembly accession")?,
            ),
            AuthorityType::Ensembl => {
                let scientific_name = metadata
                    .scientific_name
                    .as_deref()
                    .unwrap_or_default()
                    .replace('_', " ");
                let taxon_id = taxonomy
                    .taxid(&scientific_name)
                    .with_context(|| format!("No NCBI taxon id for '{}'", scientific_name))?
                    .to_string();
                let accession = options.assembly_accession.clone().ok_or_else(|| {
                    anyhow!("The assembly ID is required for Ensembl URLs. Please provide the assembly ID.")
                })?;
                (taxon_id, accession)
            },
        };

        let assembly_version = assembly_accession.split_once('.').map(|(_, v)| v.to_string());
        let genome_version = metadata.release_version.clone();
        let genome_label = format!("{}-{}-{}", authority.as_str(), taxon_id, genome_version);

        let organism_taxon = generate_organism_taxon(taxonomy, &taxon_id)?;
        let genome_assembly = generate_genome_assembly(
            &organism_taxon,
            &assembly_accession,
            assembly_version.as_deref(),
            &metadata.assembly_name,
            options.assembly_strain.as_deref(),
        )?;
        let checksums = generate_digest(digests, &options.hash_functions)?;
        let genome_annotation = generate_genome_annotation(
            content_url,
            authority,
            &organism_taxon,
            &genome_assembly,
            &checksums,
            &genome_label,
            &genome_version,
        )?;

        Ok(Self {
            content_url: content_url.to_string(),
            feature_filter: options.feature_filter.clone(),
            organism_taxon,
            genome_assembly,
            checksums,
            genome_annotation,
            gene_annotations: Vec::new(),
            gene_index: HashMap::new(),
        })
    }

    /// Download the content URL and build the metadata objects
    ///
    /// The returned file is deleted when dropped.
    pub async fn from_url(
        content_url: &str,
        options: &Gff3Options,
        taxonomy: &TaxonomyLookup,
    ) -> Result<(Self, DownloadedFile)> {
        if parse_url(content_url).is_none() {
            bail!("The provided content URL is not supported. Please provide a valid URL.");
        }
        let downloaded = download_gff_file(content_url, options.timeout).await?;
        let translator = Self::new(content_url, options, taxonomy, &downloaded.digests)?;
        Ok((translator, downloaded))
    }

    pub fn content_url(&self) -> &str {
        &self.content_url
    }

    pub fn authority(&self) -> AuthorityType {
        self.genome_annotation.authority
    }

    pub fn organism_taxon(&self) -> &OrganismTaxon {
        &self.organism_taxon
    }

    pub fn genome_assembly(&self) -> &GenomeAssembly {
        &self.genome_assembly
    }

    pub fn genome_annotation(&self) -> &GenomeAnnotation {
        &self.genome_annotation
    }

    pub fn checksums(&self) -> &[Checksum] {
        &self.checksums
    }

    pub fn gene_annotations(&self) -> &[GeneAnnotation] {
        &self.gene_annotations
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<usize> {
        self.parse(open_gff3(path)?)
    }

    /// Translate the gene rows of a GFF3 stream; returns the number of rows read
    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut rows = 0;
        for row in FeatureRows::new(reader) {
            let row = row?;
            rows += 1;
            if !self.feature_filter.iter().any(|f| *f == row.feature_type) {
                continue;
            }

            match self.authority() {
                AuthorityType::Ensembl => {
                    if let Some(gene) =
                        self.generate_ensembl_gene_annotation(&row.attributes, row.line_number)
                    {
                        let key = gene.id.clone();
                        self.insert_gene(key, gene);
                    }
                },
                AuthorityType::Ncbi => {
                    self.add_ncbi_gene_annotation(&row.attributes, row.line_number);
                },
            }
        }
        info!(rows, genes = self.gene_annotations.len(), "Parsed GFF3 file");
        Ok(rows)
    }

    fn insert_gene(&mut self, key: String, gene: GeneAnnotation) {
        match self.gene_index.get(&key) {
            Some(&position) => self.gene_annotations[position] = gene,
            None => {
                self.gene_index.insert(key, self.gene_annotations.len());
                self.gene_annotations.push(gene);
            },
        }
    }

    fn gene_attributes(&self) -> Value {
        json!({
            "referenced_in": self.genome_annotation.id,
            "in_taxon": [self.organism_taxon.id],
            "in_taxon_label": self.organism_taxon.full_name,
            "type": ["bican:GeneAnnotation"],
        })
    }

    /// Gene annotation for an Ensembl row; `None` when skipped or already present
    pub fn generate_ensembl_gene_annotation(
        &self,
        attributes: &Attributes,
        line_number: usize,
    ) -> Option<GeneAnnotation> {
        let Some(gene_id) = get_attribute(attributes, "gene_id", line_number) else {
            error!(
                "Line {}: No GeneAnnotation object created for this row due to missing gene_id attribute.",
                line_number
            );
            return None;
        };
        let stable_id = gene_id.split('.').next().unwrap_or_default().to_string();
        let name = get_attribute(attributes, "Name", line_number);
        let description = get_attribute(attributes, "description", line_number);
        let biotype = get_attribute(attributes, "biotype", line_number);

        let mut gene = self.gene_attributes();
        gene["source_id"] = json!(stable_id);
        gene["symbol"] = json!(name);
        gene["name"] = json!(name);
        gene["description"] = json!(description);
        gene["molecular_type"] = json!(biotype);
        gene["xref"] = json!([format!("{}{}", ENSEMBL_GENE_ID_PREFIX, stable_id)]);

        match build::<GeneAnnotation>(gene) {
            Ok(gene) if self.gene_index.contains_key(&gene.id) => {
                debug!("Line {}: duplicate GeneAnnotation for {}", line_number, stable_id);
                None
            },
            Ok(gene) => Some(gene),
            Err(e) => {
                error!("Line {}: {}", line_number, e);
                None
            },
        }
    }

    /// Gene annotation for an NCBI row, before duplicate resolution
    pub fn generate_ncbi_gene_annotation(
        &self,
        attributes: &Attributes,
        line_number: usize,
    ) -> Option<GeneAnnotation> {
        if !attributes.contains_key("Dbxref") {
            error!(
                "Line {}: No GeneAnnotation object created for this row due to missing dbxref attribute.",
                line_number
            );
            return None;
        }

        let gene_ids: std::collections::BTreeSet<String> = split_values(attributes, "Dbxref")
            .iter()
            .filter_map(|reference| reference.split_once(':'))
            .filter(|(key, _)| *key == "GeneID")
            .map(|(_, value)| value.split('.').next().unwrap_or_default().to_string())
            .collect();
        let stable_id = match gene_ids.iter().next() {
            Some(id) if gene_ids.len() == 1 && !id.is_empty() => id.clone(),
            _ => {
                error!(
                    "Line {}: No GeneAnnotation object created for this row due to number of GeneIDs provided in dbxref attribute is not equal to one.",
                    line_number
                );
                return None;
            },
        };

        let name = get_attribute(attributes, "Name", line_number);
        let description = get_attribute(attributes, "description", line_number);
        let biotype = get_attribute(attributes, "gene_biotype", line_number);
        let synonyms: Vec<String> = split_values(attributes, "gene_synonym").into_iter().collect();
        if synonyms.is_empty() {
            debug!(
                "Line {}: synonym is not set for this row's GeneAnnotation object due to missing gene_synonym attribute.",
                line_number
            );
        }

        let mut gene = self.gene_attributes();
        gene["source_id"] = json!(stable_id);
        gene["symbol"] = json!(name);
        gene["name"] = json!(name);
        gene["description"] = json!(description);
        gene["molecular_type"] = json!(biotype);
        gene["synonym"] = json!(synonyms);
        gene["xref"] = json!([format!("{}{}", NCBI_GENE_ID_PREFIX, stable_id)]);

        match build::<GeneAnnotation>(gene) {
            Ok(gene) => Some(gene),
            Err(e) => {
                error!("Line {}: {}", line_number, e);
                None
            },
        }
    }

    fn add_ncbi_gene_annotation(&mut self, attributes: &Attributes, line_number: usize) {
        let Some(gene) = self.generate_ncbi_gene_annotation(attributes, line_number) else {
            return;
        };
        let key = gene.source_id.clone();

        let Some(&position) = self.gene_index.get(&key) else {
            self.insert_gene(key, gene);
            return;
        };
        let existing = &self.gene_annotations[position];
        if *existing == gene {
            return;
        }
        if let Some(resolved) = resolve_ncbi_gene_annotation(existing, gene, line_number) {
            self.insert_gene(key, resolved);
        }
    }

    pub fn to_jsonld(&self) -> Result<JsonLdDocument> {
        let mut document = JsonLdDocument::new(GENOME_ANNOTATION_CONTEXT);
        document.push(&self.organism_taxon)?;
        document.push(&self.genome_assembly)?;
        document.push(&self.genome_annotation)?;
        document.extend(&self.checksums)?;
        document.extend(&self.gene_annotations)?;
        Ok(document)
    }

    pub fn serialize_to_jsonld(&self) -> Result<String> {
        Ok(self.to_jsonld()?.to_pretty_string()?)
    }
}

/// Pick between two different annotations of the same NCBI gene
///
/// Returns the new annotation when it should replace the existing one.
fn resolve_ncbi_gene_annotation(
    existing: &GeneAnnotation,
    new: GeneAnnotation,
    line_number: usize,
) -> Option<GeneAnnotation> {
    match (&existing.description, &new.description) {
        (Some(_), None) => return None,
        (None, Some(_)) => return Some(new),
        _ => {},
    }
    match (&existing.molecular_type, &new.molecular_type) {
        (Some(_), None) => return None,
        (None, Some(_)) => return Some(new),
        _ => {},
    }
    if existing.is_protein_coding() {
        return None;
    }
    if new.is_protein_coding() {
        return Some(new);
    }
    error!(
        "Line {}: Unable to resolve duplicates for GeneID: {}.\nexisting gene: {:?}\nnew gene: {:?}",
        line_number, new.source_id, existing, new
    );
    None
}

pub fn generate_organism_taxon(taxonomy: &TaxonomyLookup, taxon_id: &str) -> Result<OrganismTaxon> {
    let full_name = taxonomy
        .scientific_name(taxon_id)
        .with_context(|| format!("Taxon id {} not found in the NCBI taxonomy", taxon_id))?;
    build(json!({
        "full_name": full_name,
        "name": taxonomy.common_name(taxon_id),
        "iri": format!("{}{}", TAXON_IRI_PREFIX, taxon_id),
        "type": ["bican:OrganismTaxon"],
        "xref": [format!("{}{}", TAXON_PREFIX, taxon_id)],
    }))
}

pub fn generate_genome_assembly(
    taxon: &OrganismTaxon,
    assembly_accession: &str,
    assembly_version: Option<&str>,
    assembly_label: &str,
    assembly_strain: Option<&str>,
) -> Result<GenomeAssembly> {
    build(json!({
        "in_taxon": [taxon.id],
        "in_taxon_label": taxon.full_name,
        "name": assembly_label,
        "version": assembly_version,
        "strain": assembly_strain,
        "type": ["bican:GenomeAssembly"],
        "xref": [format!("{}{}", ASSEMBLY_PREFIX, assembly_accession)],
    }))
}

/// One checksum object per requested algorithm, duplicates ignored
pub fn generate_digest(
    digests: &DigestValues,
    hash_functions: &[DigestAlgorithm],
) -> Result<Vec<Checksum>> {
    let mut checksums: Vec<Checksum> = Vec::new();
    for &algorithm in hash_functions {
        let checksum: Checksum = build(json!({
            "checksum_algorithm": DigestType::from(algorithm),
            "value": digests.get(algorithm),
            "type": ["bican:Checksum"],
        }))?;
        if !checksums.iter().any(|c| c.id == checksum.id) {
            checksums.push(checksum);
        }
    }
    Ok(checksums)
}

pub fn generate_genome_annotation(
    content_url: &str,
    authority: AuthorityType,
    taxon: &OrganismTaxon,
    assembly: &GenomeAssembly,
    checksums: &[Checksum],
    genome_label: &str,
    genome_version: &str,
) -> Result<GenomeAnnotation> {
    let digest: Vec<&str> = checksums.iter().map(|c| c.id.as_str()).collect();
    build(json!({
        "digest": digest,
        "content_url": [content_url],
        "reference_assembly": assembly.id,
        "version": genome_version,
        "in_taxon": [taxon.id],
        "in_taxon_label": taxon.full_name,
        "description": format!(
            "{} {} Annotation Release {}",
            authority.as_str(),
            taxon.full_name,
            genome_version
        ),
        "authority": authority,
        "type": ["bican:GenomeAnnotation"],
        "xref": [format!("{}{}", BICAN_ANNOTATION_PREFIX, genome_label.to_uppercase())],
    }))
}

/// Download, translate and serialize one GFF3 file
pub async fn gff2jsonld(
    content_url: &str,
    options: &Gff3Options,
    taxonomy: &TaxonomyLookup,
) -> Result<String> {
    let (translator, downloaded) =
        GenomeAnnotationTranslator::from_url(content_url, options, taxonomy).await?;
    translate_downloaded(translator, downloaded).await
}

/// Parse the downloaded file off the async runtime, then serialize
async fn translate_downloaded(
    mut translator: GenomeAnnotationTranslator,
    downloaded: DownloadedFile,
) -> Result<String> {
    let translator = tokio::task::spawn_blocking(move || -> Result<GenomeAnnotationTranslator> {
        translator.parse_file(downloaded.file.path())?;
        Ok(translator)
    })
    .await
    .context("GFF3 parser task failed")??;
    translator.serialize_to_jsonld()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NCBI_URL: &str = "https://ftp.ncbi.nlm.nih.gov/genomes/all/annotation_releases/10090/GCF_000001635.27-RS_2024_02/GCF_000001635.27_GRCm39_genomic.gff.gz";
    const ENSEMBL_URL: &str =
        "https://ftp.ensembl.org/pub/release-111/gff3/mus_musculus/Mus_musculus.GRCm39.111.gff3.gz";

    fn taxonomy() -> TaxonomyLookup {
        TaxonomyLookup::from_names([("10090", "Mus musculus", Some("house mouse"))])
    }

    fn digests() -> DigestValues {
        DigestValues {
            md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            sha1: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
            sha256: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".to_string(),
        }
    }

    fn ncbi() -> GenomeAnnotationTranslator {
        GenomeAnnotationTranslator::new(NCBI_URL, &Gff3Options::default(), &taxonomy(), &digests())
            .unwrap()
    }

    fn gff(rows: &[&str]) -> Cursor<String> {
        Cursor::new(format!("##gff-version 3\n{}\n", rows.join("\n")))
    }

    #[test]
    fn test_ncbi_metadata() {
        let translator = ncbi();
        let taxon = translator.organism_taxon();
        assert_eq!(taxon.full_name, "Mus musculus");
        assert_eq!(taxon.name.as_deref(), Some("house mouse"));
        assert_eq!(taxon.iri, "http://purl.obolibrary.org/obo/NCBITaxon_10090");
        assert_eq!(taxon.xref, vec!["NCBITaxon:10090"]);

        let assembly = translator.genome_assembly();
        assert_eq!(assembly.name, "GRCm39");
        assert_eq!(assembly.version.as_deref(), Some("27"));
        assert_eq!(assembly.xref, vec!["NCBIAssembly:GCF_000001635.27"]);
        assert_eq!(assembly.in_taxon, vec![taxon.id.clone()]);

        let annotation = translator.genome_annotation();
        assert_eq!(annotation.version, "RS_2024_02");
        assert_eq!(annotation.description, "NCBI Mus musculus Annotation Release RS_2024_02");
        assert_eq!(annotation.xref, vec!["bican:annotation-NCBI-10090-RS_2024_02"]);
        assert_eq!(annotation.reference_assembly, assembly.id);
        assert_eq!(annotation.content_url, vec![NCBI_URL]);

        let checksums = translator.checksums();
        assert_eq!(checksums.len(), 1);
        assert_eq!(checksums[0].checksum_algorithm, DigestType::Md5);
        assert_eq!(annotation.digest, vec![checksums[0].id.clone()]);
    }

    #[test]
    fn test_ncbi_gene_row() {
        let mut translator = ncbi();
        translator
            .parse(gff(&[
                "NC_000067.7\tBestRefSeq\tgene\t3269956\t3741733\t.\t-\t.\tID=gene-Xkr4;Dbxref=GeneID:497097,MGI:MGI:3528744;Name=Xkr4;description=X-linked Kx blood group related 4;gbkey=Gene;gene=Xkr4;gene_biotype=protein_coding;gene_synonym=Gm210,mKIAA1889",
                "NC_000067.7\tBestRefSeq\tmRNA\t3269956\t3741733\t.\t-\t.\tID=rna-NM_001011874.1;Dbxref=GeneID:497097",
            ]))
            .unwrap();

        let genes = translator.gene_annotations();
        assert_eq!(genes.len(), 1);
        let gene = &genes[0];
        assert_eq!(gene.source_id, "497097");
        assert_eq!(gene.symbol.as_deref(), Some("Xkr4"));
        assert_eq!(gene.description.as_deref(), Some("X-linked Kx blood group related 4"));
        assert_eq!(gene.molecular_type, Some(BioType::ProteinCoding));
        assert_eq!(gene.synonym, Some(vec!["Gm210".to_string(), "mKIAA1889".to_string()]));
        assert_eq!(gene.xref, vec!["NCBIGene:497097"]);
        assert_eq!(gene.referenced_in, translator.genome_annotation().id);
    }

    #[test]
    fn test_ncbi_rows_without_single_gene_id_are_skipped() {
        let mut translator = ncbi();
        translator
            .parse(gff(&[
                "NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tID=gene-a;Name=A",
                "NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tID=gene-b;Dbxref=GeneID:1,GeneID:2;Name=B",
                "NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tID=gene-c;Dbxref=GeneID:3.1,GeneID:3.2;Name=C",
            ]))
            .unwrap();
        let genes = translator.gene_annotations();
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].source_id, "3");
    }

    #[test]
    fn test_ncbi_duplicates_prefer_description_then_protein_coding() {
        let mut translator = ncbi();
        translator
            .parse(gff(&[
                "NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tDbxref=GeneID:10;Name=A;gene_biotype=lncRNA",
                "NC_1\tRefSeq\tgene\t5\t9\t.\t+\t.\tDbxref=GeneID:10;Name=A;description=first;gene_biotype=lncRNA",
                "NC_1\tRefSeq\tgene\t5\t9\t.\t+\t.\tDbxref=GeneID:10;Name=A;description=second;gene_biotype=protein_coding",
                "NC_1\tRefSeq\tpseudogene\t1\t2\t.\t+\t.\tDbxref=GeneID:11;Name=B;description=x;gene_biotype=protein_coding",
                "NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tDbxref=GeneID:11;Name=B;description=x;gene_biotype=pseudogene",
            ]))
            .unwrap();

        let genes = translator.gene_annotations();
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[0].description.as_deref(), Some("second"));
        assert!(genes[0].is_protein_coding());
        assert!(genes[1].is_protein_coding());
    }

    #[test]
    fn test_ensembl_requires_assembly_accession() {
        let err = GenomeAnnotationTranslator::new(
            ENSEMBL_URL,
            &Gff3Options::default(),
            &taxonomy(),
            &digests(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("assembly ID is required"));
    }

    #[test]
    fn test_ensembl_genes() {
        let options = Gff3Options {
            assembly_accession: Some("GCF_000001635.27".to_string()),
            hash_functions: vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha256],
            ..Default::default()
        };
        let mut translator =
            GenomeAnnotationTranslator::new(ENSEMBL_URL, &options, &taxonomy(), &digests()).unwrap();
        assert_eq!(translator.authority(), AuthorityType::Ensembl);
        assert_eq!(translator.checksums().len(), 2);
        assert_eq!(
            translator.genome_annotation().xref,
            vec!["bican:annotation-ENSEMBL-10090-111"]
        );

        let row = "1\tensembl_havana\tgene\t3143476\t3144545\t.\t+\t.\tID=gene:ENSMUSG00000102693;Name=4933401J01Rik;biotype=TEC;description=RIKEN cDNA 4933401J01 gene [Source:MGI Symbol%3BAcc:MGI:1918292];gene_id=ENSMUSG00000102693.2;logic_name=havana_mouse;version=2";
        translator
            .parse(gff(&[row, row, "1\tensembl\tgene\t1\t2\t.\t+\t.\tID=gene:x;Name=X"]))
            .unwrap();

        let genes = translator.gene_annotations();
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].source_id, "ENSMUSG00000102693");
        assert_eq!(genes[0].description.as_deref(), Some("RIKEN cDNA 4933401J01 gene"));
        assert_eq!(genes[0].molecular_type, Some(BioType::Other("TEC".to_string())));
        assert_eq!(genes[0].xref, vec!["ENSEMBL:ENSMUSG00000102693"]);
        assert_eq!(genes[0].synonym, None);
    }

    #[test]
    fn test_jsonld_order() {
        let mut translator = ncbi();
        translator
            .parse(gff(&["NC_1\tRefSeq\tgene\t1\t2\t.\t+\t.\tDbxref=GeneID:10;Name=A"]))
            .unwrap();
        let document = translator.to_jsonld().unwrap();
        assert_eq!(document.context, GENOME_ANNOTATION_CONTEXT);
        let types: Vec<&str> = document
            .graph
            .iter()
            .map(|node| node["type"][0].as_str().unwrap())
            .collect();
        assert_eq!(
            types,
            vec![
                "bican:OrganismTaxon",
                "bican:GenomeAssembly",
                "bican:GenomeAnnotation",
                "bican:Checksum",
                "bican:GeneAnnotation"
            ]
        );
    }

    #[tokio::test]
    async fn test_downloaded_gzip_to_jsonld() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let body = "##gff-version 3\n\
NC_000067.7\tBestRefSeq\tgene\t3269956\t3741733\t.\t-\t.\tID=gene-Xkr4;Dbxref=GeneID:497097;Name=Xkr4;gene_biotype=protein_coding\n\
NC_000067.7\tBestRefSeq\tmRNA\t3269956\t3741733\t.\t-\t.\tID=rna-1;Dbxref=GeneID:497097\n\
NC_000067.7\tGnomon\tgene\t3269956\t3741733\t.\t-\t.\tID=gene-Xkr4-2;Dbxref=GeneID:497097;Name=Xkr4;description=X-linked Kx blood group related 4;gene_biotype=protein_coding\n\
NC_000067.7\tBestRefSeq\tpseudogene\t4000\t5000\t.\t+\t.\tID=gene-Gm1;Dbxref=GeneID:100;Name=Gm1;gene_biotype=pseudogene\n";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        let gzipped = encoder.finish().unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/GCF_000001635.27_GRCm39_genomic.gff.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(gzipped))
            .mount(&server)
            .await;

        let downloaded = download_gff_file(
            &format!("{}/GCF_000001635.27_GRCm39_genomic.gff.gz", server.uri()),
            None,
        )
        .await
        .unwrap();
        let digests = downloaded.digests.clone();
        let options = Gff3Options {
            hash_functions: vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha256, DigestAlgorithm::Md5],
            ..Default::default()
        };
        let translator =
            GenomeAnnotationTranslator::new(NCBI_URL, &options, &taxonomy(), &digests).unwrap();

        let jsonld = translate_downloaded(translator, downloaded).await.unwrap();
        let document: Value = serde_json::from_str(&jsonld).unwrap();
        assert_eq!(document["@context"], GENOME_ANNOTATION_CONTEXT);
        let graph = document["@graph"].as_array().unwrap();
        let of_type = |t: &str| {
            graph
                .iter()
                .filter(|node| node["type"][0] == t)
                .collect::<Vec<_>>()
        };

        let checksums = of_type("bican:Checksum");
        assert_eq!(checksums.len(), 2);
        assert_eq!(checksums[0]["checksum_algorithm"], "spdx:checksumAlgorithm_md5");
        assert_eq!(checksums[0]["value"], digests.md5.as_str());
        assert_eq!(checksums[1]["value"], digests.sha256.as_str());
        let annotation = of_type("bican:GenomeAnnotation");
        assert_eq!(annotation[0]["digest"], json!([checksums[0]["id"], checksums[1]["id"]]));

        let genes = of_type("bican:GeneAnnotation");
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[0]["source_id"], "497097");
        assert_eq!(genes[0]["description"], "X-linked Kx blood group related 4");
        assert_eq!(genes[1]["source_id"], "100");
        assert_eq!(genes[1]["molecular_type"], "pseudogene");
    }

    #[test]
    fn test_unsupported_url() {
        let err = GenomeAnnotationTranslator::new(
            "https://example.org/file.gff.gz",
            &Gff3Options::default(),
            &taxonomy(),
            &digests(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("not supported"));
    }
}
