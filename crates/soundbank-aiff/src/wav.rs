//! Conversion between uncompressed AIFF and PCM WAV.
//!
//! AIFF stores samples big-endian and WAV little-endian; only 8 and 16-bit
//! integer samples are handled. WAV stores 8-bit samples unsigned, which
//! `hound` maps to and from the signed samples AIFF uses.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::aiff::{AiffFile, FormType, SoundParams};
use crate::error::{AiffError, AiffResult};

/// Converts an uncompressed AIFF file to a WAV file.
pub fn aiff_to_wav(aiff: &[u8]) -> AiffResult<Vec<u8>> {
    let file = AiffFile::parse(aiff)?;
    if file.form != FormType::Aiff {
        let compression = file
            .common()?
            .compression
            .as_ref()
            .map(|c| c.kind.to_string())
            .unwrap_or_else(|| FormType::Aifc.as_str().to_string());
        return Err(AiffError::Compressed { compression });
    }
    let common = file.common()?;
    let channels = u16::try_from(common.num_channels)
        .ok()
        .filter(|c| *c > 0)
        .ok_or(AiffError::InvalidChannelCount {
            channels: common.num_channels,
        })?;
    let bits = common.sample_size.max(0) as u16;
    if bits != 8 && bits != 16 {
        return Err(AiffError::UnsupportedBitDepth { bits });
    }

    let spec = WavSpec {
        channels,
        sample_rate: common.sample_rate().round() as u32,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };
    let data = file.sound_data()?;
    tracing::debug!(
        channels,
        bits,
        sample_rate = spec.sample_rate,
        bytes = data.len(),
        "converting AIFF to WAV"
    );

    let mut out = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut out), spec)?;
    if bits == 16 {
        for pair in data.chunks_exact(2) {
            writer.write_sample(i16::from_be_bytes([pair[0], pair[1]]))?;
        }
    } else {
        for &byte in data {
            writer.write_sample(byte as i8)?;
        }
    }
    writer.finalize()?;
    Ok(out)
}

/// Converts a PCM WAV file to an uncompressed AIFF file.
pub fn wav_to_aiff(wav: &[u8]) -> AiffResult<Vec<u8>> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(AiffError::Compressed {
            compression: "IEEE float".to_string(),
        });
    }

    // the declared data length is untrusted; the payload can't exceed the input
    let declared = (reader.len() as usize).saturating_mul(spec.bits_per_sample as usize / 8);
    let mut data = Vec::with_capacity(declared.min(wav.len()));
    match spec.bits_per_sample {
        16 => {
            for sample in reader.samples::<i16>() {
                data.extend_from_slice(&sample?.to_be_bytes());
            }
        }
        8 => {
            for sample in reader.samples::<i8>() {
                data.push(sample? as u8);
            }
        }
        bits => return Err(AiffError::UnsupportedBitDepth { bits }),
    }
    let num_channels = i16::try_from(spec.channels).map_err(|_| AiffError::InvalidChannelCount {
        channels: i16::MAX,
    })?;
    tracing::debug!(
        channels = spec.channels,
        bits = spec.bits_per_sample,
        sample_rate = spec.sample_rate,
        bytes = data.len(),
        "converting WAV to AIFF"
    );

    let params = SoundParams {
        num_channels,
        sample_size: spec.bits_per_sample as i16,
        sample_rate: f64::from(spec.sample_rate),
        compression: None,
    };
    AiffFile::pcm(FormType::Aiff, params, data).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wav_16(samples: &[i16], channels: u16, rate: u32) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut out = Vec::new();
        let mut writer = WavWriter::new(Cursor::new(&mut out), spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        out
    }

    #[test]
    fn test_wav_to_aiff_swaps_to_big_endian() {
        let aiff = wav_to_aiff(&wav_16(&[0x0102, -2], 1, 22050)).unwrap();
        let file = AiffFile::parse(&aiff).unwrap();
        assert_eq!(file.sound_data().unwrap(), &[0x01, 0x02, 0xff, 0xfe]);
        assert_eq!(file.sample_rate().unwrap(), 22050.0);
        assert_eq!(file.common().unwrap().num_sample_frames, 2);
    }

    #[test]
    fn test_stereo_round_trip() {
        let samples = [100i16, -100, 32767, -32768, 0, 1];
        let wav = wav_16(&samples, 2, 44100);
        let back = aiff_to_wav(&wav_to_aiff(&wav).unwrap()).unwrap();

        let mut reader = WavReader::new(Cursor::new(back.as_slice())).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples.to_vec());
    }

    #[test]
    fn test_8bit_samples_stay_signed_in_aiff() {
        let aiff = AiffFile::pcm(
            FormType::Aiff,
            SoundParams {
                num_channels: 1,
                sample_size: 8,
                sample_rate: 8000.0,
                compression: None,
            },
            vec![0x00, 0x7f, 0x80],
        )
        .to_bytes()
        .unwrap();
        let wav = aiff_to_wav(&aiff).unwrap();
        let back = AiffFile::parse(&wav_to_aiff(&wav).unwrap()).unwrap();
        assert_eq!(back.sound_data().unwrap(), &[0x00, 0x7f, 0x80]);
    }

    #[test]
    fn test_oversized_data_length_fails_cleanly() {
        let mut wav = wav_16(&[1, 2, 3], 1, 8000);
        let data = wav
            .windows(4)
            .position(|w| w == b"data")
            .expect("hound writes a data chunk");
        wav[data + 4..data + 8].copy_from_slice(&0x7fff_fff0u32.to_le_bytes());
        assert!(wav_to_aiff(&wav).is_err());
    }

    #[test]
    fn test_aifc_rejected() {
        let aifc = AiffFile::pcm(FormType::Aifc, SoundParams::mono16(8000.0), vec![0; 4])
            .to_bytes()
            .unwrap();
        let err = aiff_to_wav(&aifc).unwrap_err();
        assert!(matches!(err, AiffError::Compressed { ref compression } if compression == "NONE"));
    }

    #[test]
    fn test_unsupported_bit_depth() {
        let aiff = AiffFile::pcm(
            FormType::Aiff,
            SoundParams {
                num_channels: 1,
                sample_size: 24,
                sample_rate: 8000.0,
                compression: None,
            },
            vec![0; 6],
        )
        .to_bytes()
        .unwrap();
        assert!(matches!(
            aiff_to_wav(&aiff),
            Err(AiffError::UnsupportedBitDepth { bits: 24 })
        ));
    }
}
